//! Infrastructure adapters for IO, config, context loading, and logging.

pub mod config;
pub mod context;
pub mod fs;
pub mod logging;
