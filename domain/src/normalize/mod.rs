//! Result normalization: classify, decode, render.
//!
//! Tool-result payloads vary in shape per tool and per provider version.
//! Normalization happens in three stages, each pure and none fallible:
//!
//! 1. [`category::CategoryTable`] classifies a result once by tool name
//!    into a [`category::ToolCategory`].
//! 2. [`payload::normalize_payload`] decodes the raw payload into a
//!    canonical [`payload::NormalizedResult`], tolerating structured
//!    objects, bare arrays, and `{content:[{type,text}]}` fragment lists.
//! 3. [`render::render`] turns the canonical value into prose or a
//!    markdown table.

pub mod category;
pub mod payload;
pub mod render;
