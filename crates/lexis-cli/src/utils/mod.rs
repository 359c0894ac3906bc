//! Shared helpers for the CLI entry point.

pub mod logging;
