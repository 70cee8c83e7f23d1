//! # Host integration
//!
//! ## Overview
//!
//! The engine doesn't perform any editing itself. Instead, it relies on a host application to
//! interpret keys, open and close undo groups, and schedule timers. Hosts implement
//! [ActionDispatcher], [UndoScope] and [TimerScheduler], and then automatically implement
//! [RemapHost].
use std::fmt::Display;

use crate::timer::{EpisodeId, TimerTicket};

/// The outcome of executing a sequence of keys.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Execution<E> {
    /// Every key was executed.
    Completed,

    /// Execution stopped at the key at `index`, and no later keys were executed.
    Failed {
        /// Position of the key that failed.
        index: usize,

        /// What went wrong.
        error: E,
    },
}

impl<E> Execution<E> {
    /// Whether execution stopped early.
    pub fn is_failed(&self) -> bool {
        matches!(self, Execution::Failed { .. })
    }
}

/// Interprets keys that have been fully resolved.
pub trait ActionDispatcher<K, M> {
    /// Error produced when a key or command fails.
    type Error: Display;

    /// The mode the host is currently in.
    fn mode(&self) -> M;

    /// Execute keys in order as if typed in `mode`, stopping at the first one that fails.
    fn execute(&mut self, keys: &[K], mode: M) -> Execution<Self::Error>;

    /// Run a named command.
    fn invoke_command(&mut self, name: &str, args: &[String]) -> Result<(), Self::Error>;

    /// Whether `key` can start or continue a remapping right now.
    ///
    /// Keys that the host has already given another meaning, like a `0` that continues a count,
    /// are executed without looking them up.
    fn allows_remap(&self, key: &K) -> bool {
        let _ = key;
        true
    }
}

/// Groups the edits made while applying a remapping into a single undo step.
pub trait UndoScope {
    /// Start grouping edits.
    fn begin(&mut self);

    /// Stop grouping edits.
    fn end(&mut self);
}

/// Schedules calls back into the engine.
pub trait TimerScheduler {
    /// Call [RemapEngine::timeout](crate::RemapEngine::timeout) with the ticket's episode after
    /// the ticket's duration has passed.
    fn schedule(&mut self, ticket: TimerTicket);

    /// The engine is no longer waiting on this episode.
    ///
    /// Expired episodes are ignored by the engine, so hosts may leave this as a no-op.
    fn cancel(&mut self, episode: EpisodeId) {
        let _ = episode;
    }
}

/// Everything the engine needs from its host.
pub trait RemapHost<K, M>: ActionDispatcher<K, M> + UndoScope + TimerScheduler {}

impl<K, M, T> RemapHost<K, M> for T where T: ActionDispatcher<K, M> + UndoScope + TimerScheduler {}
