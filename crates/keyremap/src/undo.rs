//! # Undo grouping
//!
//! ## Overview
//!
//! Applying a remapping can run many actions, and can expand into further remappings. The
//! [UndoScopeManager] makes sure that the host sees a single [UndoScope::begin] when the first
//! remapping is applied, and a single [UndoScope::end] once every key it produced has been
//! handled, no matter how deeply the remappings nested.
use crate::host::UndoScope;

/// Tracks the undo group for the current chain of remappings.
#[derive(Debug, Default)]
pub struct UndoScopeManager {
    depth: usize,
}

impl UndoScopeManager {
    /// Create a new manager with no open group.
    pub fn new() -> Self {
        UndoScopeManager::default()
    }

    /// Note that a remapping is being applied, opening a group on the host if there isn't
    /// already one.
    pub fn enter<U: UndoScope + ?Sized>(&mut self, host: &mut U) {
        if self.depth == 0 {
            host.begin();
        }

        self.depth += 1;
    }

    /// Close the host's group, if one is open.
    pub fn finish<U: UndoScope + ?Sized>(&mut self, host: &mut U) {
        if self.depth > 0 {
            host.end();
            self.depth = 0;
        }
    }

    /// Whether a group is currently open.
    pub fn is_open(&self) -> bool {
        self.depth > 0
    }

    /// How many remappings have been applied in the current group.
    pub fn applied(&self) -> usize {
        self.depth
    }
}
