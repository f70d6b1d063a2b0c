//! Infrastructure - configuration and logging
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults)
//! - `logging` - tracing-subscriber initialisation

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::Config;
