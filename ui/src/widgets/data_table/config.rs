//! Persisted column visibility and order, keyed by [`TableId`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::TableId;

/// Persisted per-table column preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub visible_columns: Vec<String>,
    pub column_order: Vec<String>,
}

impl ColumnConfig {
    /// The default configuration: every column visible, declared order.
    pub fn all(keys: &[String]) -> Self {
        Self {
            visible_columns: keys.to_vec(),
            column_order: keys.to_vec(),
        }
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible_columns.iter().any(|k| k == key)
    }

    pub fn toggle_visible(&mut self, key: &str) {
        if self.is_visible(key) {
            self.visible_columns.retain(|k| k != key);
        } else {
            self.visible_columns.push(key.to_owned());
        }
    }
}

/// Reconciles a stored configuration against the current column definitions.
///
/// Stale keys (no longer defined) are dropped from both lists; keys that are
/// defined but absent from the stored lists are appended to the end. Absent
/// or corrupt stored data falls back to the default without error.
pub fn reconcile(stored: Option<ColumnConfig>, keys: &[String]) -> ColumnConfig {
    let Some(mut config) = stored else {
        return ColumnConfig::all(keys);
    };

    config.visible_columns.retain(|k| keys.contains(k));
    config.column_order.retain(|k| keys.contains(k));
    for key in keys {
        if !config.column_order.contains(key) {
            config.column_order.push(key.clone());
            if !config.visible_columns.contains(key) {
                config.visible_columns.push(key.clone());
            }
        }
    }
    config
}

/// Backing store for column configuration.
///
/// No error surface: a load that fails for any reason is `None` and the
/// caller falls back to defaults. Writes are last-write-wins; the UI is
/// single-threaded so there are no concurrent writers.
pub trait ColumnConfigStore {
    fn load(&self, id: TableId) -> Option<ColumnConfig>;
    fn save(&mut self, id: TableId, config: &ColumnConfig);
}

/// Store backed by egui's persisted memory, which eframe writes to disk
/// (native) or local storage (web) alongside the rest of the app state.
pub struct EguiConfigStore {
    ctx: egui::Context,
}

impl EguiConfigStore {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl ColumnConfigStore for EguiConfigStore {
    fn load(&self, id: TableId) -> Option<ColumnConfig> {
        self.ctx
            .data_mut(|data| data.get_persisted::<ColumnConfig>(egui::Id::new(id.storage_key())))
    }

    fn save(&mut self, id: TableId, config: &ColumnConfig) {
        self.ctx.data_mut(|data| {
            data.insert_persisted(egui::Id::new(id.storage_key()), config.clone());
        });
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryConfigStore {
    entries: BTreeMap<TableId, ColumnConfig>,
}

impl ColumnConfigStore for MemoryConfigStore {
    fn load(&self, id: TableId) -> Option<ColumnConfig> {
        self.entries.get(&id).cloned()
    }

    fn save(&mut self, id: TableId, config: &ColumnConfig) {
        self.entries.insert(id, config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn absent_config_falls_back_to_all_columns() {
        let config = reconcile(None, &keys(&["title", "amount"]));
        assert_eq!(config.visible_columns, keys(&["title", "amount"]));
        assert_eq!(config.column_order, keys(&["title", "amount"]));
    }

    #[test]
    fn stale_keys_are_dropped_from_both_lists() {
        let stored = ColumnConfig {
            visible_columns: keys(&["title", "ghost"]),
            column_order: keys(&["ghost", "title", "amount"]),
        };
        let config = reconcile(Some(stored), &keys(&["title", "amount"]));
        assert_eq!(config.visible_columns, keys(&["title"]));
        assert_eq!(config.column_order, keys(&["title", "amount"]));
    }

    #[test]
    fn new_definition_keys_are_appended() {
        let stored = ColumnConfig {
            visible_columns: keys(&["title"]),
            column_order: keys(&["title"]),
        };
        let config = reconcile(Some(stored), &keys(&["title", "custom_vendor"]));
        assert_eq!(config.column_order, keys(&["title", "custom_vendor"]));
        assert_eq!(config.visible_columns, keys(&["title", "custom_vendor"]));
    }

    #[test]
    fn appended_keys_preserve_a_stored_hide() {
        // A key that is still in the stored order but hidden stays hidden.
        let stored = ColumnConfig {
            visible_columns: keys(&["title"]),
            column_order: keys(&["title", "amount"]),
        };
        let config = reconcile(Some(stored), &keys(&["title", "amount"]));
        assert_eq!(config.visible_columns, keys(&["title"]));
        assert_eq!(config.column_order, keys(&["title", "amount"]));
    }

    #[test]
    fn memory_store_round_trips_per_table() {
        let mut store = MemoryConfigStore::default();
        let config = ColumnConfig::all(&keys(&["title"]));
        store.save(TableId::Records, &config);
        assert_eq!(store.load(TableId::Records), Some(config));
        assert_eq!(store.load(TableId::CalendarRoutines), None);
    }

    #[test]
    fn visibility_toggle_rebuilds_the_list() {
        let mut config = ColumnConfig::all(&keys(&["title", "amount"]));
        config.toggle_visible("amount");
        assert!(!config.is_visible("amount"));
        config.toggle_visible("amount");
        assert!(config.is_visible("amount"));
    }
}
