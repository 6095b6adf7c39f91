//! Presentation timestamps carried by stream chunks

use std::fmt;

/// A presentation timestamp in stream time-base ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    /// Timestamp value in time-base units
    pub value: i64,
}

impl Timestamp {
    /// Create a new timestamp
    pub fn new(value: i64) -> Self {
        Timestamp { value }
    }

    /// No timestamp / unknown timestamp
    pub fn none() -> Self {
        Timestamp { value: i64::MIN }
    }

    /// Check if timestamp is valid
    pub fn is_valid(&self) -> bool {
        self.value != i64::MIN
    }

    /// The timestamp as an `Option`, `None` when unknown
    pub fn get(&self) -> Option<i64> {
        self.is_valid().then_some(self.value)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::none()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "NOPTS"),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp::new(value)
    }
}

impl From<Option<i64>> for Timestamp {
    fn from(value: Option<i64>) -> Self {
        value.map_or_else(Timestamp::none, Timestamp::new)
    }
}
