//! # Configuration snapshots
//!
//! ## Overview
//!
//! A [ConfigProvider] holds the current [RemapTables], and lets them be replaced while engines
//! are running. Engines take a snapshot when an episode starts, so a reload never changes the
//! tables that an in-progress episode is being matched against.
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use crate::table::RemapTables;
use crate::{InputKey, RemapMode};

/// Shares the current remapping tables.
pub struct ConfigProvider<K, M: RemapMode> {
    tables: ArcSwap<RemapTables<K, M>>,
}

impl<K: InputKey, M: RemapMode> ConfigProvider<K, M> {
    /// Create a provider that starts out with the given tables.
    pub fn new(tables: RemapTables<K, M>) -> Self {
        ConfigProvider { tables: ArcSwap::from_pointee(tables) }
    }

    /// Get the current tables.
    pub fn snapshot(&self) -> Arc<RemapTables<K, M>> {
        self.tables.load_full()
    }

    /// Replace the current tables, and return the previous ones.
    pub fn swap(&self, tables: RemapTables<K, M>) -> Arc<RemapTables<K, M>> {
        info!("Reloaded remapping tables");

        self.tables.swap(Arc::new(tables))
    }
}

impl<K: InputKey, M: RemapMode> Default for ConfigProvider<K, M> {
    fn default() -> Self {
        ConfigProvider::new(RemapTables::default())
    }
}

impl<K: InputKey, M: RemapMode> std::fmt::Debug for ConfigProvider<K, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigProvider").field("tables", &self.snapshot()).finish()
    }
}
