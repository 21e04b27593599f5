//! Study session orchestration: configuration, backend contract, progress
//! reporting and the lifecycle controller.

pub mod backend;
mod config;
#[cfg(feature = "http-backend")]
mod http_backend;
mod lifecycle;
mod progress;
mod session;

pub use backend::StudyBackend;
pub use config::SessionConfig;
#[cfg(feature = "http-backend")]
pub use http_backend::HttpStudyBackend;
pub use lifecycle::{ControlState, FailedStage, LifecyclePhase};
pub use progress::{ProgressMessage, ProgressReporter, StudyView};
pub use session::StudyLifecycle;
