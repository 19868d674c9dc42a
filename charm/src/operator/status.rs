use std::fmt;

use serde::{Deserialize, Serialize};

/// Health of a unit as surfaced to operators.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum UnitStatus {
    Active(String),
    Blocked(String),
    Maintenance(String),
}

impl UnitStatus {
    #[must_use]
    pub fn active(message: impl Into<String>) -> Self { Self::Active(message.into()) }

    #[must_use]
    pub fn blocked(message: impl Into<String>) -> Self { Self::Blocked(message.into()) }

    #[must_use]
    pub fn maintenance(message: impl Into<String>) -> Self { Self::Maintenance(message.into()) }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Active(message) | Self::Blocked(message) | Self::Maintenance(message) => message,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Active(_) => "active",
            Self::Blocked(_) => "blocked",
            Self::Maintenance(_) => "maintenance",
        }
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool { matches!(self, Self::Blocked(_)) }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}
