//! # screengraph-cli
//!
//! Command-line interface for the ScreenGraph automation tools.
//!
//! ## Commands
//!
//! - `screengraph platforms`: list supported platforms
//! - `screengraph validate <platform>`: pre-flight platform check
//! - `screengraph tools`: print the tool catalog
//! - `screengraph config`: show the effective configuration
//! - `screengraph probe`: open a session, gather device state, close it

pub mod commands;

pub use commands::Cli;
