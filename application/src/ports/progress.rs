//! Progress notification port
//!
//! Defines the interface for reporting progress while a turn runs.

/// Callback for progress updates during a chat turn
///
/// Implementations live in the presentation layer and can surface
/// progress in various ways (streamed HTTP events, logs, etc.)
pub trait ChatProgress: Send + Sync {
    /// Called once the visible tool set has been planned and filtered.
    fn on_tools_selected(&self, _names: &[String]) {}

    /// Called when a tool invocation starts.
    fn on_tool_call(&self, _name: &str) {}

    /// Called when a tool invocation finishes.
    fn on_tool_result(&self, _name: &str, _success: bool) {}

    /// Called for each text block produced by the model.
    fn on_text(&self, _text: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoChatProgress;

impl ChatProgress for NoChatProgress {}
