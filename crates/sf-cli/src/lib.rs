//! Focus timer CLI library.
//!
//! This crate provides the `sf` command-line front end for the session engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
