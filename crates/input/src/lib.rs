//! Operator input: the commands a console (or any other front end) can issue
//! into the multiverse.
//!
//! # Invariants
//! - The runtime consumes [`ConsoleCommand`]s, never raw text.
//! - Unrecognized input maps to `None` and is ignored.

pub mod command;

pub use command::ConsoleCommand;
