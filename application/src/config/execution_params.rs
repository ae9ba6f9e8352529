//! Execution parameters for turn loop control.
//!
//! [`ExecutionParams`] groups the static parameters that control the
//! execution loop in [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Execution loop control parameters.
///
/// Controls the tool round-trip cap, the wall-clock budget for the
/// primary generation call, and the freshness window of the cached
/// tool-provider session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum tool-call/tool-result round trips within one turn.
    pub max_roundtrips: usize,
    /// Wall-clock budget for the execution loop.
    pub timeout: Duration,
    /// Freshness window for the cached tool-provider session.
    pub session_ttl: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_roundtrips: 8,
            timeout: Duration::from_secs(40),
            session_ttl: Duration::from_secs(300),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_roundtrips(mut self, max: usize) -> Self {
        self.max_roundtrips = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
