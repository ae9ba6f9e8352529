//! Operator guidance file loading.
//!
//! The guidance file carries free-form instructions appended to the chat
//! system prompt (preferred databases, naming conventions, tone). A
//! missing or unreadable file downgrades to no guidance.

use std::path::Path;

use tracing::{debug, warn};

/// Read the guidance file, if configured and readable.
pub fn load_guidance(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match std::fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => {
            debug!("Guidance file {} is empty", path.display());
            None
        }
        Ok(text) => {
            debug!("Loaded {} bytes of guidance from {}", text.len(), path.display());
            Some(text)
        }
        Err(e) => {
            warn!("Failed to read guidance file {}: {e}", path.display());
            None
        }
    }
}
