//! Lockdown CLI - Command-line interface for Lockdown
//!
//! This crate provides the CLI application that ties together all Lockdown components.

pub mod config;
pub mod failure;
pub mod summary;

pub use config::Config;
pub use failure::{failure_message, Stage};
pub use summary::render_summary;
