//! CLI command implementations.

pub mod common;
pub mod config;
pub mod effects;
pub mod process;
pub mod state;
