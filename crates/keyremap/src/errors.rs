//! # Remapping errors
//!
//! ## Overview
//!
//! This module contains the errors that can be produced while building remapping tables, and
//! while resolving typed keys against them.
use thiserror::Error;

/// Errors produced when adding a [Remapping](crate::Remapping) to a table.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum TableError {
    /// A remapping needs at least one key to trigger it.
    #[error("Remapped key sequence is empty")]
    EmptyBefore,

    /// A table already contains a remapping for the same key sequence.
    #[error("Duplicate remapped key sequence: {before}")]
    Duplicate {
        /// The repeated key sequence.
        before: String,
    },
}

/// Errors produced while resolving remappings.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum RemapError {
    /// Expanding remappings exceeded the maximum depth without any action being performed.
    #[error("E223: Recursive mapping (exceeded a depth of {depth})")]
    RecursiveMapping {
        /// The maximum depth that was exceeded.
        depth: usize,
    },

    /// A command bound to a remapping failed to run.
    #[error("Failed to run command {name}: {message}")]
    Command {
        /// The name of the command that failed.
        name: String,

        /// The message produced by the command's failure.
        message: String,
    },
}

impl RemapError {
    /// Whether this error aborts the whole resolution episode.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RemapError::RecursiveMapping { .. })
    }
}
