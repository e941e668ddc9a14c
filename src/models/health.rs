//! Liveness payload.

use serde::{Deserialize, Serialize};

/// Body returned by the liveness endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
}

impl HealthCheck {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self::new("OK")
    }
}
