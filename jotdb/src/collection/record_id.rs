use crate::errors::{ErrorKind, JotError, JotResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A unique identifier for a record in a collection.
///
/// Record ids are opaque lowercase hex strings generated by the store at
/// insert time. The leading portion encodes the creation time in microseconds,
/// so ids generated by one process sort roughly chronologically, but callers
/// must not rely on the internal layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Parses a [RecordId] from its string form.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidId] if the string is empty or contains
    /// characters outside lowercase hex.
    pub fn parse(value: &str) -> JotResult<RecordId> {
        if value.is_empty() {
            log::error!("Record id cannot be empty");
            return Err(JotError::new(
                "Record id cannot be empty",
                ErrorKind::InvalidId,
            ));
        }

        if !value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            log::error!("Invalid record id: {}", value);
            return Err(JotError::new(
                &format!("Invalid record id: {}", value),
                ErrorKind::InvalidId,
            ));
        }

        Ok(RecordId(value.to_string()))
    }

    /// Wraps an id produced by the generator. Internal use only; the value is
    /// known to be valid hex.
    pub(crate) fn from_generated(value: String) -> RecordId {
        RecordId(value)
    }

    /// Returns the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
