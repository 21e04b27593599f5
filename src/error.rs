use thiserror::Error;

pub type StudyResult<T> = Result<T, StudyError>;

#[derive(Debug, Error)]
pub enum StudyError {
    /// Draft rejected before any network call was made.
    #[error("{0}")]
    Validation(String),

    /// Operation invoked out of lifecycle order.
    #[error("invalid lifecycle state: {0}")]
    State(String),

    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx response. `message` carries the server-supplied `error` field.
    #[error("{}", backend_message(*.status, .message.as_deref()))]
    Backend { status: u16, message: Option<String> },

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// One of the paired result fetches failed.
    #[error("Failed to load map data: {0}")]
    ResultLoad(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl StudyError {
    /// Message shown to the user after the operation prefix.
    ///
    /// Backend errors prefer the server message; everything else uses its
    /// display form.
    #[must_use]
    pub fn user_detail(&self) -> String {
        match self {
            Self::Backend {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }

    /// Validation errors never disable a control, so they never need a retry.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

fn backend_message(status: u16, message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => message.to_owned(),
        _ => format!("server returned HTTP {status}"),
    }
}
