//! Bill-splitting library
//!
//! Exposes the allocation engine and its session operations for the CLI and
//! for integration testing.

pub mod domain;
pub mod error;
pub mod infra;
pub mod io;
pub mod services;
