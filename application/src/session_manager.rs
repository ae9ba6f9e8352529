//! Cached tool-provider session with a freshness window.
//!
//! Establishing a provider session spawns a child process and performs a
//! protocol handshake, so sessions are reused across turns. The manager
//! holds `{session, established_at}` and re-establishes once the window
//! expires. Concurrent callers during establishment share one in-flight
//! future (single-flight) instead of each spawning a provider.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, warn};

use crate::config::ExecutionParams;
use crate::ports::tool_provider::{ProviderError, ToolProvider, ToolSession};

type EstablishFuture = Shared<BoxFuture<'static, Result<Arc<dyn ToolSession>, String>>>;

struct CacheState {
    cached: Option<(Arc<dyn ToolSession>, Instant)>,
    pending: Option<EstablishFuture>,
}

/// Owns the cached tool-provider session.
pub struct SessionManager {
    provider: Arc<dyn ToolProvider>,
    params: ExecutionParams,
    state: Mutex<CacheState>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn ToolProvider>, params: ExecutionParams) -> Self {
        Self {
            provider,
            params,
            state: Mutex::new(CacheState {
                cached: None,
                pending: None,
            }),
        }
    }

    /// Get a fresh session, establishing one if the cache is empty or
    /// past its freshness window.
    pub async fn acquire(&self) -> Result<Arc<dyn ToolSession>, ProviderError> {
        let establish = {
            let mut state = self.state.lock().map_err(|_| ProviderError::Closed)?;

            if let Some((session, established_at)) = &state.cached {
                if established_at.elapsed() < self.params.session_ttl {
                    return Ok(Arc::clone(session));
                }
                // Stale: close it off the hot path. Teardown failures are
                // logged and swallowed; they never affect the turn.
                let stale = Arc::clone(session);
                state.cached = None;
                tokio::spawn(async move {
                    if let Err(e) = stale.close().await {
                        warn!("Failed to close stale provider session: {e}");
                    }
                });
            }

            match &state.pending {
                Some(pending) => pending.clone(),
                None => {
                    let provider = Arc::clone(&self.provider);
                    let future: BoxFuture<'static, Result<Arc<dyn ToolSession>, String>> =
                        async move { provider.connect().await.map_err(|e| e.to_string()) }.boxed();
                    let shared = future.shared();
                    state.pending = Some(shared.clone());
                    shared
                }
            }
        };

        let result = establish.await;

        let mut state = self.state.lock().map_err(|_| ProviderError::Closed)?;
        state.pending = None;
        match result {
            Ok(session) => {
                debug!("Established tool-provider session");
                state.cached = Some((Arc::clone(&session), Instant::now()));
                Ok(session)
            }
            Err(message) => Err(ProviderError::Transport(message)),
        }
    }

    /// Drop and close the cached session, if any.
    pub async fn release(&self) {
        let cached = {
            match self.state.lock() {
                Ok(mut state) => state.cached.take(),
                Err(_) => None,
            }
        };
        if let Some((session, _)) = cached {
            if let Err(e) = session.close().await {
                warn!("Failed to close provider session: {e}");
            }
        }
    }
}
