//! Command-line interface for the Atlas client
//!
//! Three stages take an argv to an effect: `expand` rewrites abbreviated
//! long flags to their full names, `args` parses the command grammar, and
//! `commands` dispatches each parsed command onto exactly one API
//! operation. Errors from any stage travel up to `main` unprinted.

pub mod args;
pub mod commands;
pub mod expand;

pub use args::{Cli, Commands, GlobalArgs};
pub use expand::expand_flag_prefixes;
