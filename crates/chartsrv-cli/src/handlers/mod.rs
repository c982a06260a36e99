//! Command handlers.
//!
//! Each handler exposes an `execute` function that takes the composed
//! [`CliContext`](crate::CliContext) (or builds none when it needs no
//! supervisor) and returns `anyhow::Result<()>`.

pub mod config;
pub mod data;
pub mod reap;
pub mod run;
