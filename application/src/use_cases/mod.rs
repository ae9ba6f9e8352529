//! Use cases (application services)

pub mod plan_tools;
pub mod run_turn;
