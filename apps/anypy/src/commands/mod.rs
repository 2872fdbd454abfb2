//! Command implementations for the anypy CLI.
//!
//! anypy has a single command surface; [`provision`] downloads an interpreter
//! and, unless asked otherwise, builds a virtual environment with it.

pub mod provision;
