//! Shared server state.

use std::sync::Arc;

use mongochat_application::RunTurnUseCase;
use mongochat_domain::Model;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub use_case: Arc<RunTurnUseCase>,
    pub model: Model,
}

impl AppState {
    pub fn new(use_case: Arc<RunTurnUseCase>, model: Model) -> Self {
        Self { use_case, model }
    }
}
