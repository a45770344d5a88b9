use playerbus_core::config::DEFAULT_MAX_TOPIC_LEN;
use playerbus_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of an event channel.
///
/// Never empty, never whitespace-only, and free of control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn new(name: impl Into<String>) -> CoreResult<Self> {
        Self::parse_with_limit(name, DEFAULT_MAX_TOPIC_LEN)
    }

    pub fn parse_with_limit(name: impl Into<String>, max_len: usize) -> CoreResult<Self> {
        let name = name.into();
        validate(&name, max_len)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Checks a borrowed topic name without allocating.
pub fn validate(name: &str, max_len: usize) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidArgument(
            "topic must not be empty".to_string(),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(CoreError::InvalidArgument(format!(
            "topic {name:?} contains control characters"
        )));
    }
    if name.len() > max_len {
        return Err(CoreError::InvalidArgument(format!(
            "topic is {} bytes long, limit is {max_len}",
            name.len()
        )));
    }
    Ok(())
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Topic {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Topic::new(value)
    }
}

impl TryFrom<&str> for Topic {
    type Error = CoreError;

    fn try_from(value: &str) -> CoreResult<Self> {
        Topic::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}
