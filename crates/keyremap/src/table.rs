//! # Remapping tables
//!
//! ## Overview
//!
//! This module contains the types used to describe remappings, and the prefix-indexed tables
//! that store them for each mode.
//!
//! Every mode has a [TablePair]: one [RemapTable] for recursive remappings, and one for
//! non-recursive remappings. Tables are built up front, and then treated as immutable
//! snapshots while keys are being resolved.
use std::collections::HashMap;
use std::sync::Arc;

use radix_trie::{Trie, TrieCommon};

use crate::errors::TableError;
use crate::{InputKey, RemapMode};

/// Separates encoded keys inside of a [RemapTable]'s index.
///
/// This byte never occurs in UTF-8 text, so a key sequence's encoding is only a prefix of
/// another's encoding when the keys themselves are a prefix.
const KEY_SEPARATOR: u8 = 0xFF;

fn encode<'a, K: InputKey + 'a>(keys: impl IntoIterator<Item = &'a K>) -> Vec<u8> {
    let mut enc = Vec::new();

    for key in keys {
        enc.extend_from_slice(key.to_string().as_bytes());
        enc.push(KEY_SEPARATOR);
    }

    return enc;
}

/// A named command to run when a remapping is triggered.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RemapCommand {
    /// The name of the command.
    pub name: String,

    /// Arguments to pass to the command.
    pub args: Vec<String>,
}

impl RemapCommand {
    /// Create a new command that takes no arguments.
    pub fn new<T: Into<String>>(name: T) -> Self {
        RemapCommand { name: name.into(), args: vec![] }
    }

    /// Create a new command that takes the given arguments.
    pub fn with_args<T: Into<String>>(name: T, args: Vec<String>) -> Self {
        RemapCommand { name: name.into(), args }
    }
}

/// What happens when a remapping is triggered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RemapAction<K> {
    /// Replace the triggering keys with a different key sequence.
    Keys(Vec<K>),

    /// Run a list of commands in order.
    Commands(Vec<RemapCommand>),
}

/// A single remapping from one key sequence to a [RemapAction].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Remapping<K> {
    before: Vec<K>,
    action: RemapAction<K>,
    recursive: bool,
}

impl<K: InputKey> Remapping<K> {
    /// Create a new remapping.
    ///
    /// When `recursive` is true, keys produced by this remapping can trigger further
    /// remappings.
    pub fn new(before: Vec<K>, action: RemapAction<K>, recursive: bool) -> Result<Self, TableError> {
        if before.is_empty() {
            return Err(TableError::EmptyBefore);
        }

        Ok(Remapping { before, action, recursive })
    }

    /// The key sequence that triggers this remapping.
    pub fn before(&self) -> &[K] {
        self.before.as_slice()
    }

    /// What to do when this remapping is triggered.
    pub fn action(&self) -> &RemapAction<K> {
        &self.action
    }

    /// Whether keys produced by this remapping are themselves eligible for remapping.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Whether this remapping's keys begin with its own triggering sequence, like `j` to `jzz`.
    ///
    /// When this is true of a recursive remapping, the leading keys of the expansion are not
    /// remapped again.
    pub fn is_self_prefixed(&self) -> bool {
        match &self.action {
            RemapAction::Keys(after) => after.starts_with(&self.before),
            RemapAction::Commands(_) => false,
        }
    }

    /// Render the triggering keys the way they are displayed to users.
    pub fn describe(&self) -> String {
        self.before.iter().map(ToString::to_string).collect()
    }
}

/// A prefix-indexed table of remappings.
#[derive(Clone, Debug)]
pub struct RemapTable<K> {
    trie: Trie<Vec<u8>, Arc<Remapping<K>>>,
    entries: Vec<Arc<Remapping<K>>>,
}

impl<K: InputKey> RemapTable<K> {
    /// Create a new, empty table.
    pub fn new() -> Self {
        RemapTable { trie: Trie::new(), entries: vec![] }
    }

    /// Add a remapping to this table.
    ///
    /// This fails if the table already contains a remapping with the same triggering keys.
    pub fn insert(&mut self, remap: Remapping<K>) -> Result<(), TableError> {
        let enc = encode(remap.before());

        if self.trie.get(&enc).is_some() {
            return Err(TableError::Duplicate { before: remap.describe() });
        }

        let remap = Arc::new(remap);
        self.trie.insert(enc, remap.clone());
        self.entries.push(remap);

        Ok(())
    }

    /// Find the remapping triggered by exactly these keys.
    pub fn lookup_exact(&self, keys: &[K]) -> Option<&Arc<Remapping<K>>> {
        if keys.is_empty() {
            return None;
        }

        self.trie.get(&encode(keys))
    }

    /// Whether some remapping in this table is triggered by a longer sequence starting with
    /// these keys.
    pub fn lookup_potential(&self, keys: &[K]) -> bool {
        if keys.is_empty() {
            return !self.entries.is_empty();
        }

        let enc = encode(keys);

        match self.trie.get_raw_descendant(&enc) {
            Some(subtrie) => subtrie.keys().any(|k| k.len() > enc.len() && k.starts_with(&enc)),
            None => false,
        }
    }

    /// Iterate over the remappings in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Remapping<K>> {
        self.entries.iter().map(|remap| remap.as_ref())
    }

    /// The number of remappings in this table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this table has no remappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: InputKey> Default for RemapTable<K> {
    fn default() -> Self {
        RemapTable::new()
    }
}

/// The recursive and non-recursive tables for a single mode.
#[derive(Clone, Debug)]
pub struct TablePair<K> {
    /// Remappings whose expansions are eligible for further remapping.
    pub recursive: RemapTable<K>,

    /// Remappings whose expansions are never remapped.
    pub nonrecursive: RemapTable<K>,
}

impl<K: InputKey> TablePair<K> {
    /// Get the table that holds recursive or non-recursive remappings.
    pub fn table(&self, recursive: bool) -> &RemapTable<K> {
        if recursive {
            &self.recursive
        } else {
            &self.nonrecursive
        }
    }

    fn table_mut(&mut self, recursive: bool) -> &mut RemapTable<K> {
        if recursive {
            &mut self.recursive
        } else {
            &mut self.nonrecursive
        }
    }

    /// Whether both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.recursive.is_empty() && self.nonrecursive.is_empty()
    }
}

impl<K: InputKey> Default for TablePair<K> {
    fn default() -> Self {
        TablePair { recursive: RemapTable::new(), nonrecursive: RemapTable::new() }
    }
}

/// The remapping tables for every mode.
#[derive(Clone, Debug)]
pub struct RemapTables<K, M: RemapMode> {
    modes: HashMap<M, TablePair<K>>,
}

impl<K: InputKey, M: RemapMode> RemapTables<K, M> {
    /// Create an empty set of tables.
    pub fn new() -> Self {
        RemapTables { modes: HashMap::new() }
    }

    /// Add a remapping that applies in the given mode.
    ///
    /// The remapping goes into the tables for [RemapMode::remap_scope].
    pub fn insert(&mut self, mode: M, remap: Remapping<K>) -> Result<(), TableError> {
        let recursive = remap.is_recursive();

        self.modes
            .entry(mode.remap_scope())
            .or_default()
            .table_mut(recursive)
            .insert(remap)
    }

    /// Get the tables that apply in the given mode.
    pub fn pair(&self, mode: M) -> Option<&TablePair<K>> {
        self.modes.get(&mode.remap_scope())
    }

    /// Whether there are no remappings for any mode.
    pub fn is_empty(&self) -> bool {
        self.modes.values().all(TablePair::is_empty)
    }
}

impl<K: InputKey, M: RemapMode> Default for RemapTables<K, M> {
    fn default() -> Self {
        RemapTables::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
    enum TestMode {
        Normal,
        Visual,
        VisualLine,
    }

    impl RemapMode for TestMode {
        fn remap_scope(&self) -> Self {
            match self {
                TestMode::VisualLine => TestMode::Visual,
                m => *m,
            }
        }
    }

    fn keys(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn remap(before: &str, after: &str) -> Remapping<char> {
        Remapping::new(keys(before), RemapAction::Keys(keys(after)), true).unwrap()
    }

    #[test]
    fn test_empty_before() {
        let res = Remapping::new(vec![], RemapAction::Keys(keys("x")), true);
        assert_eq!(res.unwrap_err(), TableError::EmptyBefore);
    }

    #[test]
    fn test_duplicate() {
        let mut table = RemapTable::new();
        table.insert(remap("ab", "x")).unwrap();

        let err = table.insert(remap("ab", "y")).unwrap_err();
        assert_eq!(err, TableError::Duplicate { before: "ab".into() });
        assert_eq!(table.len(), 1);

        let exact = table.lookup_exact(&keys("ab")).unwrap();
        assert_eq!(exact.action(), &RemapAction::Keys(keys("x")));
    }

    #[test]
    fn test_lookup() {
        let mut table = RemapTable::new();
        table.insert(remap("w", "b")).unwrap();
        table.insert(remap("wwx", "e")).unwrap();

        assert!(table.lookup_exact(&keys("w")).is_some());
        assert!(table.lookup_exact(&keys("ww")).is_none());
        assert!(table.lookup_exact(&keys("wwx")).is_some());
        assert!(table.lookup_exact(&[]).is_none());

        assert_eq!(table.lookup_potential(&keys("w")), true);
        assert_eq!(table.lookup_potential(&keys("ww")), true);
        assert_eq!(table.lookup_potential(&keys("wwx")), false);
        assert_eq!(table.lookup_potential(&keys("x")), false);
    }

    #[test]
    fn test_lookup_key_boundaries() {
        // Multi-character renderings of a key mustn't look like prefixes of each other.
        #[derive(Clone, Debug, Hash, Eq, PartialEq)]
        struct Named(&'static str);

        impl std::fmt::Display for Named {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl InputKey for Named {
            type Error = ();

            fn from_macro_str(_: &str) -> Result<Vec<Self>, ()> {
                Err(())
            }
        }

        let mut table = RemapTable::new();
        let before = vec![Named("<C-A>"), Named("b")];
        let remap = Remapping::new(before, RemapAction::Keys(vec![Named("c")]), false).unwrap();
        table.insert(remap).unwrap();

        assert_eq!(table.lookup_potential(&[Named("<C-A>")]), true);
        assert_eq!(table.lookup_potential(&[Named("<C-")]), false);
        assert!(table.lookup_exact(&[Named("<C-A>b")]).is_none());
        assert!(table.lookup_exact(&[Named("<C-A>"), Named("b")]).is_some());
    }

    #[test]
    fn test_self_prefixed() {
        assert_eq!(remap("j", "jzz").is_self_prefixed(), true);
        assert_eq!(remap("ab", "abcd").is_self_prefixed(), true);
        assert_eq!(remap("ab", "ba").is_self_prefixed(), false);
        assert_eq!(remap("ab", "a").is_self_prefixed(), false);

        let cmds = RemapAction::Commands(vec![RemapCommand::new("write")]);
        let remap = Remapping::new(keys("w"), cmds, true).unwrap();
        assert_eq!(remap.is_self_prefixed(), false);
    }

    #[test]
    fn test_tables_scope() {
        let mut tables = RemapTables::default();
        assert!(tables.is_empty());

        tables.insert(TestMode::VisualLine, remap("x", "d")).unwrap();
        let norec = Remapping::new(keys("y"), RemapAction::Keys(keys("c")), false).unwrap();
        tables.insert(TestMode::Visual, norec).unwrap();

        let pair = tables.pair(TestMode::Visual).unwrap();
        assert_eq!(pair.recursive.len(), 1);
        assert_eq!(pair.nonrecursive.len(), 1);
        assert!(pair.table(true).lookup_exact(&keys("x")).is_some());
        assert!(pair.table(false).lookup_exact(&keys("y")).is_some());

        assert!(tables.pair(TestMode::VisualLine).is_some());
        assert!(tables.pair(TestMode::Normal).is_none());
        assert!(!tables.is_empty());

        // The same sequence can appear once in each table.
        tables.insert(TestMode::Visual, remap("y", "x")).unwrap();
        let err = tables.insert(TestMode::VisualLine, remap("y", "x")).unwrap_err();
        assert_eq!(err, TableError::Duplicate { before: "y".into() });
    }
}
