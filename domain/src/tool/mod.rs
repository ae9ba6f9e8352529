//! Tool catalog, execution records, and the visibility gate.

pub mod catalog;
pub mod records;
pub mod visibility;
