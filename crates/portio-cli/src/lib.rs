//! portio CLI library components.
//!
//! The commands are plain functions returning serializable reports so they
//! can be tested without a terminal. The main binary is in `main.rs`.

pub mod commands;
pub mod logging;
pub mod output;

pub use output::{emit, OutputFormat, Report};
