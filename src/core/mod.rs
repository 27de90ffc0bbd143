//! Core types - pure abstractions shared across the codebase.

mod paths;
mod state;

pub use paths::PathSet;
pub use state::{is_shutdown, setup_shutdown_handler};
