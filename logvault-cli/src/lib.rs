//! # logvault-cli
//!
//! Command-line front end for the log store and its compliance archive.
//! The binary in `main.rs` only parses arguments, initialises logging and
//! dispatches to [`commands`]; everything else lives here so it can be tested.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod retry;
