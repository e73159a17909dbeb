//! Layered settings store.
//!
//! Three layers, highest precedence first:
//! 1. **Overrides** - values set explicitly at runtime (`set`)
//! 2. **Config** - values read or merged from TOML files
//! 3. **Defaults** - fallbacks registered with `set_default`
//!
//! Keys are dotted paths (`server.address`) and case-insensitive.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ConfError, ConfResult};

use super::merge::{deep_merge, lowercase_keys, lowercase_table};
use super::value::{Table, Value, table_from_toml, table_to_toml};

#[derive(Debug, Clone, Default)]
pub struct Settings {
    overrides: Table,
    config: Table,
    defaults: Table,
    config_file: Option<PathBuf>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key across all layers.
    ///
    /// Layers are searched from highest to lowest precedence. A plain value
    /// at the key, or at any parent of it, hides everything below it, just
    /// as it does in `all_settings`. When the value found is a table, tables
    /// at the same path in lower layers are merged underneath it.
    pub fn get(&self, key: &str) -> Option<Value> {
        let path = split_key(key);
        if path.is_empty() {
            return None;
        }

        let mut found: Option<Value> = None;
        for layer in self.layers() {
            let value = match probe(layer, &path) {
                Probe::Found(value) => value,
                Probe::Missing => continue,
                Probe::Shadowed => break,
            };
            let merged = match (found.take(), value) {
                (None, value) => value.clone(),
                (Some(Value::Table(upper)), Value::Table(lower)) => {
                    let mut merged = lower.clone();
                    deep_merge(&mut merged, upper);
                    Value::Table(merged)
                }
                (Some(upper), _) => return Some(upper),
            };
            let is_table = matches!(merged, Value::Table(_));
            found = Some(merged);
            if !is_table {
                break;
            }
        }
        found
    }

    /// Whether `get` would return a value for the key.
    pub fn is_set(&self, key: &str) -> bool {
        let path = split_key(key);
        if path.is_empty() {
            return false;
        }

        for layer in self.layers() {
            match probe(layer, &path) {
                Probe::Found(_) => return true,
                Probe::Missing => continue,
                Probe::Shadowed => return false,
            }
        }
        false
    }

    /// Set a value in the override layer.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        insert_path(&mut self.overrides, key, value.into());
    }

    /// Register a fallback used only when no other layer holds the key.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        insert_path(&mut self.defaults, key, value.into());
    }

    /// Replace the config layer with the contents of a TOML document.
    pub fn read_toml(&mut self, source: &str) -> Result<(), toml::de::Error> {
        let parsed: toml::Table = toml::from_str(source)?;
        self.config = lowercase_table(table_from_toml(parsed));
        Ok(())
    }

    /// Deep-merge a TOML document into the config layer.
    pub fn merge_toml(&mut self, source: &str) -> Result<(), toml::de::Error> {
        let parsed: toml::Table = toml::from_str(source)?;
        self.merge_table(table_from_toml(parsed));
        Ok(())
    }

    /// Deep-merge an already-parsed table into the config layer.
    pub fn merge_table(&mut self, table: Table) {
        deep_merge(&mut self.config, lowercase_table(table));
    }

    /// Replace the config layer with the contents of a TOML file and
    /// remember the file as the one in use.
    pub fn read_file(&mut self, path: &Path) -> ConfResult<()> {
        let content = fs::read_to_string(path).map_err(|source| ConfError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        self.read_toml(&content).map_err(|e| ConfError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.config_file = Some(path.to_path_buf());
        Ok(())
    }

    /// The file last loaded with `read_file`, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// All layers merged into one nested table.
    pub fn all_settings(&self) -> Table {
        let mut merged = self.defaults.clone();
        deep_merge(&mut merged, self.config.clone());
        deep_merge(&mut merged, self.overrides.clone());
        merged
    }

    /// Every leaf key of the merged settings as a dotted path, sorted.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.all_settings(), "", &mut keys);
        keys
    }

    /// Serialize the merged settings as a TOML document.
    pub fn to_toml_string(&self) -> ConfResult<String> {
        toml::to_string(&table_to_toml(&self.all_settings())).map_err(|e| ConfError::Serialize {
            message: e.to_string(),
        })
    }

    /// Layers from highest to lowest precedence.
    fn layers(&self) -> [&Table; 3] {
        [&self.overrides, &self.config, &self.defaults]
    }

    /// A new store holding this store's merged settings as overrides.
    ///
    /// Defaults, file values and overrides all collapse into one layer, so
    /// the copy no longer distinguishes where a value came from.
    pub fn snapshot(&self) -> Settings {
        Settings {
            overrides: self.all_settings(),
            config: Table::new(),
            defaults: Table::new(),
            config_file: self.config_file.clone(),
        }
    }
}

/// Split a dotted key into lowercase segments, dropping empty ones.
fn split_key(key: &str) -> Vec<String> {
    key.split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Where a dotted path leads inside one layer.
enum Probe<'a> {
    Found(&'a Value),
    /// Nothing at the path; lower layers decide.
    Missing,
    /// A parent segment holds a plain value, hiding lower layers.
    Shadowed,
}

fn probe<'a>(table: &'a Table, path: &[String]) -> Probe<'a> {
    let Some((last, parents)) = path.split_last() else {
        return Probe::Missing;
    };

    let mut current = table;
    for segment in parents {
        match current.get(segment) {
            None => return Probe::Missing,
            Some(Value::Table(next)) => current = next,
            Some(_) => return Probe::Shadowed,
        }
    }
    current.get(last).map_or(Probe::Missing, Probe::Found)
}

fn insert_path(table: &mut Table, key: &str, value: Value) {
    let path = split_key(key);
    let Some((last, parents)) = path.split_last() else {
        tracing::debug!(event = "layerconf.store.empty_key_ignored", key = key);
        return;
    };

    let mut current = table;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Table(Table::new()));
        if !matches!(slot, Value::Table(_)) {
            *slot = Value::Table(Table::new());
        }
        current = match slot {
            Value::Table(next) => next,
            _ => return,
        };
    }
    current.insert(last.clone(), lowercase_keys(value));
}

fn collect_keys(table: &Table, prefix: &str, keys: &mut Vec<String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(nested) if !nested.is_empty() => collect_keys(nested, &path, keys),
            _ => keys.push(path),
        }
    }
}
