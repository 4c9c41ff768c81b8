use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::audit::error::{invalid_input, AuditError};

/// Kind of product event audited per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ProductCreated,
    ProductUpdated,
    ProductRead,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::ProductCreated,
        EventType::ProductUpdated,
        EventType::ProductRead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ProductCreated => "product_created",
            EventType::ProductUpdated => "product_updated",
            EventType::ProductRead => "product_read",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| invalid_input(format!("unknown event type \"{}\"", s)))
    }
}
