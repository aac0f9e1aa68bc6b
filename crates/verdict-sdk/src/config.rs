//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a decision engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Wall-clock budget per run; nodes not reached in time fail with a
    /// timeout cause instead of evaluating
    pub deadline: Option<Duration>,

    /// Fail a decision whose value violates its declared result type,
    /// instead of recording warnings alongside the value
    pub strict_types: bool,

    /// Validate computed values against declared result types
    pub validate_results: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            deadline: None,
            strict_types: false,
            validate_results: true,
        }
    }

    /// Set the per-run deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Enable strict result-type enforcement
    pub fn strict(mut self) -> Self {
        self.strict_types = true;
        self
    }

    /// Disable result-type validation entirely
    pub fn without_validation(mut self) -> Self {
        self.validate_results = false;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
