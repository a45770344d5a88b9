use std::any::Any;
use std::fmt;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    SubscriberFailure(#[from] SubscriberFailure),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
}

/// Why a subscriber callback did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The callback returned an error.
    Error(String),
    /// The callback panicked; holds the panic message when it was a string.
    Panic(String),
}

impl FailureReason {
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        FailureReason::Panic(message)
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, FailureReason::Panic(_))
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Error(msg) => write!(f, "returned error: {msg}"),
            FailureReason::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// A subscriber that failed during one emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscriber #{sequence} on topic '{topic}' {reason}")]
pub struct SubscriberFailure {
    pub topic: String,
    pub sequence: u64,
    pub reason: FailureReason,
}
