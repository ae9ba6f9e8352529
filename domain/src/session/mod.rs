//! Conversation session types: turns, messages, model responses.

pub mod entities;
pub mod reply;
pub mod response;
