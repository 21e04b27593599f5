use crate::error::{StudyError, StudyResult};

/// Linear mapping from a numeric domain onto an output range.
///
/// Outputs are clamped to the range, matching how map-style `interpolate`
/// expressions hold the edge stop value outside the stop domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(
        domain_start: f64,
        domain_end: f64,
        range_start: f64,
        range_end: f64,
    ) -> StudyResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(StudyError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(StudyError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Position of `value` inside the domain, clamped to `[0, 1]`.
    ///
    /// Non-finite input maps to the domain start.
    #[must_use]
    pub fn normalize(self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        let span = self.domain_end - self.domain_start;
        ((value - self.domain_start) / span).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let t = self.normalize(value);
        self.range_start + t * (self.range_end - self.range_start)
    }
}
