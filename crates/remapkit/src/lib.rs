//! # remapkit
//!
//! ## Overview
//!
//! This crate provides Vim-style key remapping for terminal applications. It builds on the
//! generic engine in [keyremap] with:
//!
//! * [key::KeyToken], a canonical terminal keypress that can be written in Vim's `<...>`
//!   notation, along with a [streaming tokenizer](key::Tokenizer) for the notation
//! * [mode::VimMode], Vim's editing modes, grouped the way `:imap`, `:nmap`, `:vmap`, `:omap`
//!   and `:cmap` group them
//! * [config::RemapConfig], a [serde] configuration snapshot that can be validated and turned
//!   into remapping tables
//!
//! ## Example
//!
//! ```
//! use remapkit::config::RemapConfig;
//! use remapkit::mode::VimMode;
//!
//! let config: RemapConfig = serde_json::from_str(r#"{
//!     "leader": "<Space>",
//!     "insertModeKeyBindings": [
//!         { "before": ["j", "j"], "after": ["<Esc>"] }
//!     ],
//!     "normalModeKeyBindingsNonRecursive": [
//!         { "before": ["<leader>", "w"], "commands": ["save"] }
//!     ]
//! }"#).unwrap();
//!
//! let (tables, diagnostics) = config.build();
//! assert!(diagnostics.is_empty());
//! assert!(tables.pair(VimMode::Insert).is_some());
//! assert!(tables.pair(VimMode::Replace).is_some());
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

#[macro_use]
pub mod key;

pub mod config;
pub mod mode;

pub use keyremap;

use self::key::KeyToken;
use self::mode::VimMode;

/// A remapping engine for terminal keys and Vim modes.
pub type VimRemapEngine = keyremap::RemapEngine<KeyToken, VimMode>;

/// Remapping tables for terminal keys and Vim modes.
pub type VimRemapTables = keyremap::RemapTables<KeyToken, VimMode>;

/// A provider of remapping tables for terminal keys and Vim modes.
pub type VimConfigProvider = keyremap::ConfigProvider<KeyToken, VimMode>;
