//! study-map: client-side study workflow for demand/supply analysis maps.
//!
//! A session captures a study area drawn on a map, walks the study through
//! create, process and analysis on a backend, then renders the residual
//! choropleth and store circles onto any [`render::MapSurface`].

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{SessionConfig, StudyBackend, StudyLifecycle, StudyView};
pub use error::{StudyError, StudyResult};
