//! # keyremap
//!
//! ## Overview
//!
//! This crate provides environment-agnostic components for resolving user-defined key
//! remappings, similar to `:map` and `:noremap` in [vi](https://en.wikipedia.org/wiki/Vi)
//! descended editors.
//!
//! The [RemapEngine] consumes a stream of [InputKey] values, and matches them against the
//! [RemapTables] for the current [RemapMode]. Every mode has two tables: one for recursive
//! remappings, whose expansions are themselves eligible for remapping, and one for non-recursive
//! remappings, whose expansions go straight to the [ActionDispatcher].
//!
//! When the typed keys exactly match a remapping, and no longer remapping starts with them, the
//! remapping is applied right away. When a longer remapping is still possible, the engine waits
//! for either another key or for the [AmbiguityTimer] to expire. Keys that don't start any
//! remapping are handed to the [ActionDispatcher] unchanged, and in the order they were typed.
//!
//! ## Customization
//!
//! Consumers need to provide:
//!
//! * A key type implementing [InputKey] (see `remapkit::key::KeyToken` for a terminal example)
//! * A mode type implementing [RemapMode]
//! * A host implementing [ActionDispatcher], [UndoScope] and [TimerScheduler]
//!
//! ## Example
//!
//! Here is a program that remaps "jj" to Escape in Insert mode:
//!
//! ```
//! use keyremap::{
//!     ActionDispatcher,
//!     EngineOptions,
//!     Execution,
//!     RemapAction,
//!     RemapEngine,
//!     RemapMode,
//!     RemapTables,
//!     Remapping,
//!     TimerScheduler,
//!     TimerTicket,
//!     UndoScope,
//! };
//!
//! const ESC: char = '\u{1B}';
//!
//! #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
//! enum ProgMode {
//!     Normal,
//!     Insert,
//! }
//!
//! impl RemapMode for ProgMode {}
//!
//! struct Prog {
//!     mode: ProgMode,
//!     text: String,
//!     timers: Vec<TimerTicket>,
//! }
//!
//! impl ActionDispatcher<char, ProgMode> for Prog {
//!     type Error = String;
//!
//!     fn mode(&self) -> ProgMode {
//!         self.mode
//!     }
//!
//!     fn execute(&mut self, keys: &[char], _: ProgMode) -> Execution<String> {
//!         for key in keys {
//!             match (self.mode, *key) {
//!                 (ProgMode::Insert, ESC) => self.mode = ProgMode::Normal,
//!                 (ProgMode::Insert, c) => self.text.push(c),
//!                 (ProgMode::Normal, 'i') => self.mode = ProgMode::Insert,
//!                 (ProgMode::Normal, _) => {},
//!             }
//!         }
//!
//!         Execution::Completed
//!     }
//!
//!     fn invoke_command(&mut self, _: &str, _: &[String]) -> Result<(), String> {
//!         Ok(())
//!     }
//! }
//!
//! impl UndoScope for Prog {
//!     fn begin(&mut self) {}
//!     fn end(&mut self) {}
//! }
//!
//! impl TimerScheduler for Prog {
//!     fn schedule(&mut self, ticket: TimerTicket) {
//!         self.timers.push(ticket);
//!     }
//! }
//!
//! fn main() {
//!     let mut tables = RemapTables::default();
//!     let jj = Remapping::new(vec!['j', 'j'], RemapAction::Keys(vec![ESC]), false).unwrap();
//!     tables.insert(ProgMode::Insert, jj).unwrap();
//!
//!     let mut engine = RemapEngine::from_tables(tables, EngineOptions::default());
//!     let mut prog = Prog { mode: ProgMode::Normal, text: String::new(), timers: vec![] };
//!
//!     for key in "ihello".chars() {
//!         engine.input_key(key, &mut prog).unwrap();
//!     }
//!     assert_eq!(prog.text, "hello");
//!     assert_eq!(prog.mode, ProgMode::Insert);
//!
//!     // A single "j" might be the start of "jj", so it waits.
//!     engine.input_key('j', &mut prog).unwrap();
//!     assert_eq!(prog.text, "hello");
//!
//!     // The second "j" completes the remapping.
//!     engine.input_key('j', &mut prog).unwrap();
//!     assert_eq!(prog.text, "hello");
//!     assert_eq!(prog.mode, ProgMode::Normal);
//!     assert!(prog.timers.is_empty());
//! }
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub mod buffer;
pub mod engine;
pub mod errors;
pub mod host;
pub mod provider;
pub mod resolve;
pub mod table;
pub mod timer;
pub mod undo;

pub use self::buffer::{KeyBuffer, KeyOrigin, QueuedKey};
pub use self::engine::{EngineOptions, RemapEngine, RemapState};
pub use self::errors::{RemapError, TableError};
pub use self::host::{ActionDispatcher, Execution, RemapHost, TimerScheduler, UndoScope};
pub use self::provider::ConfigProvider;
pub use self::resolve::{Classification, MatchResolver};
pub use self::table::{RemapAction, RemapCommand, RemapTable, RemapTables, Remapping, TablePair};
pub use self::timer::{AmbiguityTimer, EpisodeId, Fallback, TimerTicket};
pub use self::undo::UndoScopeManager;

/// Trait for canonical key tokens that can be remapped.
///
/// The [Display] output of a key is used to index remappings, so two keys must only display
/// the same way if they are equal.
pub trait InputKey: Clone + Debug + Display + Hash + Eq {
    /// The error type returned when parsing a macro string fails.
    type Error;

    /// Parse a string representing a series of keypresses.
    fn from_macro_str(mstr: &str) -> Result<Vec<Self>, Self::Error>;
}

impl InputKey for char {
    type Error = std::convert::Infallible;

    fn from_macro_str(mstr: &str) -> Result<Vec<Self>, Self::Error> {
        Ok(mstr.chars().collect())
    }
}

/// Trait for the input modes specific to a consumer.
pub trait RemapMode: Copy + Clone + Debug + Hash + Eq + PartialEq {
    /// Return the mode whose remappings apply while in this mode.
    ///
    /// This allows several related modes to share one set of tables. For example, Vim applies
    /// the same Visual mode mappings in characterwise, linewise and blockwise Visual mode.
    fn remap_scope(&self) -> Self {
        *self
    }
}
