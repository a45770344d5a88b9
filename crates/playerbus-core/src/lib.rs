pub mod config;
pub mod error;
pub mod logging;

pub use config::{BusConfig, FailurePolicy};
pub use error::{CoreError, CoreResult, FailureReason, SubscriberFailure};
