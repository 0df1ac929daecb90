// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for decoding dumped frames.
//!
//! This module contains the command-line interface logic, including argument parsing
//! and the `decode` / `topology` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Decode and topology commands.
pub mod decode;

/// Terminal output macros and verbosity.
pub mod logging;
