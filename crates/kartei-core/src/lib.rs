//! Shared configuration, logging and error types for the kartei crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
