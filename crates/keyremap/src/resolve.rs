//! # Match classification
//!
//! ## Overview
//!
//! The [MatchResolver] looks at the keys in the buffer, and decides whether they exactly match
//! a remapping, might still become a longer remapping, both, or neither. Both of a mode's
//! tables are consulted. When each table has an exact match, the non-recursive remapping is
//! used. This can only happen with tables built through [RemapTables::insert], since
//! configuration layers normally reject keys that are already remapped in the other table.
//!
//! [RemapTables::insert]: crate::RemapTables::insert
use std::sync::Arc;

use crate::table::{Remapping, TablePair};
use crate::InputKey;

/// How the keys in the buffer relate to the remapping tables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Classification<K> {
    /// No remapping starts with these keys.
    NoMatch,

    /// The keys trigger this remapping, and can't be extended into another.
    Exact(Arc<Remapping<K>>),

    /// The keys trigger this remapping, but could also be the start of a longer one.
    Ambiguous(Arc<Remapping<K>>),

    /// The keys are the start of one or more longer remappings.
    Potential,
}

/// Classifies buffered keys against a mode's tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchResolver;

impl MatchResolver {
    /// Classify `keys` against the given tables.
    pub fn classify<K: InputKey>(pair: Option<&TablePair<K>>, keys: &[K]) -> Classification<K> {
        let Some(pair) = pair else {
            return Classification::NoMatch;
        };

        if keys.is_empty() {
            return Classification::NoMatch;
        }

        let exact = pair
            .nonrecursive
            .lookup_exact(keys)
            .or_else(|| pair.recursive.lookup_exact(keys))
            .cloned();
        let potential =
            pair.nonrecursive.lookup_potential(keys) || pair.recursive.lookup_potential(keys);

        match (exact, potential) {
            (Some(remap), false) => Classification::Exact(remap),
            (Some(remap), true) => Classification::Ambiguous(remap),
            (None, true) => Classification::Potential,
            (None, false) => Classification::NoMatch,
        }
    }
}
