//! IO modules - the presentation layer around the engine
//!
//! This module contains everything that deals with raw user text or output:
//! - `commands` - Parsing and applying edit commands
//! - `render` - Money formatting and the text table
//! - `report` - JSON report

pub mod commands;
pub mod render;
pub mod report;

// Re-export commonly used types
pub use commands::{apply_all, Command, ParseCommandError, Rejection};
pub use render::{format_money, render_table};
pub use report::Report;
