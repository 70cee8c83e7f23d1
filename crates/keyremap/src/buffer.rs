//! # Pending keys
//!
//! ## Overview
//!
//! This module contains the types that track keys as they move through the engine. Keys wait in
//! a queue until they're examined, and then sit in the [KeyBuffer] for as long as they might
//! still be the start of a remapping.
//!
//! Every key carries a [KeyOrigin]. When an action fails, the keys that a remapping produced
//! are discarded, while keys that the user typed are kept and still processed.
use crate::{InputKey, RemapMode};

/// Where a key came from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyOrigin {
    /// The key was typed by the user.
    User,

    /// The key was produced by expanding a remapping.
    Remap,
}

/// A key waiting to be examined by the engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueuedKey<K> {
    /// The key itself.
    pub key: K,

    /// Where the key came from.
    pub origin: KeyOrigin,

    /// When true, the key is given to the dispatcher without checking for remappings.
    pub noremap: bool,
}

impl<K> QueuedKey<K> {
    /// A key typed by the user.
    pub fn user(key: K) -> Self {
        QueuedKey { key, origin: KeyOrigin::User, noremap: false }
    }

    /// A key produced by a remapping.
    pub fn remapped(key: K, noremap: bool) -> Self {
        QueuedKey { key, origin: KeyOrigin::Remap, noremap }
    }

    /// Whether this key was produced by a remapping.
    pub fn is_remapped(&self) -> bool {
        self.origin == KeyOrigin::Remap
    }
}

/// Keys that have been examined, and might still be the start of a remapping.
///
/// A buffer belongs to the mode that its first key was typed in.
#[derive(Clone, Debug)]
pub struct KeyBuffer<K, M> {
    keys: Vec<K>,
    origins: Vec<KeyOrigin>,
    mode: Option<M>,
}

impl<K: InputKey, M: RemapMode> KeyBuffer<K, M> {
    /// Create a new, empty buffer.
    pub fn new() -> Self {
        KeyBuffer { keys: vec![], origins: vec![], mode: None }
    }

    /// Add a key to the end of the buffer.
    pub fn push(&mut self, key: K, origin: KeyOrigin, mode: M) {
        if self.keys.is_empty() {
            self.mode = Some(mode);
        }

        self.keys.push(key);
        self.origins.push(origin);
    }

    /// The keys currently in the buffer.
    pub fn keys(&self) -> &[K] {
        self.keys.as_slice()
    }

    /// The mode whose remappings this buffer is being matched against.
    pub fn mode(&self) -> Option<M> {
        self.mode
    }

    /// Whether any key in the buffer was produced by a remapping.
    pub fn has_remapped(&self) -> bool {
        self.origins.contains(&KeyOrigin::Remap)
    }

    /// Remove the first `n` keys from the buffer, and return them along with the remaining
    /// keys. This leaves the buffer empty.
    pub fn split(&mut self, n: usize) -> (Vec<QueuedKey<K>>, Vec<QueuedKey<K>>) {
        let mut keys = self.take();
        let rest = keys.split_off(n.min(keys.len()));

        (keys, rest)
    }

    /// Remove and return every key in the buffer.
    pub fn take(&mut self) -> Vec<QueuedKey<K>> {
        let keys = std::mem::take(&mut self.keys);
        let origins = std::mem::take(&mut self.origins);
        self.mode = None;

        keys.into_iter()
            .zip(origins)
            .map(|(key, origin)| QueuedKey { key, origin, noremap: false })
            .collect()
    }

    /// Discard every key in the buffer.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.origins.clear();
        self.mode = None;
    }

    /// The number of keys in the buffer.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the buffer has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: InputKey, M: RemapMode> Default for KeyBuffer<K, M> {
    fn default() -> Self {
        KeyBuffer::new()
    }
}
