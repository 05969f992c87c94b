//! File-backed [`ConfigStore`] that keeps user comments and formatting intact.
//!
//! Dotted keys such as `filebrowser.enabled` map to a `[filebrowser]` table
//! with an `enabled` entry. Reads go through a parsed `toml::Table`, writes
//! are applied to a `toml_edit` document so unrelated content survives.

use std::path::{Path, PathBuf};

use log::warn;
use toml_edit::{value, DocumentMut, Item, Table};

use crate::config::ConfigStore;

fn split_key(key: &str) -> (Option<&str>, &str) {
    match key.split_once('.') {
        Some((section, name)) if !section.is_empty() && !name.is_empty() => (Some(section), name),
        _ => (None, key),
    }
}

fn set_table_value_preserving_decor(table: &mut Table, key: &str, item: Item) {
    let existing_value_decor = table
        .get(key)
        .and_then(|current| current.as_value().map(|value| value.decor().clone()));
    table[key] = item;
    if let Some(existing_value_decor) = existing_value_decor {
        if let Some(next_value) = table[key].as_value_mut() {
            *next_value.decor_mut() = existing_value_decor;
        }
    }
}

fn ensure_section_table<'a>(document: &'a mut DocumentMut, key: &str) -> &'a mut Table {
    let root = document.as_table_mut();
    let should_replace = !matches!(root.get(key), Some(item) if item.is_table());
    if should_replace {
        root.insert(key, Item::Table(Table::new()));
    }
    root.get_mut(key)
        .and_then(Item::as_table_mut)
        .expect("section table inserted above")
}

fn ensure_values_section<'a>(values: &'a mut toml::Table, key: &str) -> &'a mut toml::Table {
    let is_table = matches!(values.get(key), Some(toml::Value::Table(_)));
    if !is_table {
        values.insert(key.to_string(), toml::Value::Table(toml::Table::new()));
    }
    values
        .get_mut(key)
        .and_then(toml::Value::as_table_mut)
        .expect("section table inserted above")
}

#[derive(Debug, Clone, Default)]
pub struct TomlConfigStore {
    path: Option<PathBuf>,
    values: toml::Table,
    document: DocumentMut,
}

impl TomlConfigStore {
    /// Store without a backing file; `persist` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        let values = toml::from_str::<toml::Table>(text)
            .map_err(|err| format!("failed to parse config as TOML table: {}", err))?;
        let document = text
            .parse::<DocumentMut>()
            .map_err(|err| format!("failed to parse config as TOML document: {}", err))?;
        Ok(Self {
            path: None,
            values,
            document,
        })
    }

    /// Opens `path`. Missing or unparseable files start an empty store that
    /// will overwrite the file on the next `persist`.
    pub fn open(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    "Failed to read config file {}. Using defaults. error={}",
                    path.display(),
                    err
                );
                return Self {
                    path: Some(path.to_path_buf()),
                    ..Self::default()
                };
            }
        };
        match Self::from_toml_str(&text) {
            Ok(store) => Self {
                path: Some(path.to_path_buf()),
                ..store
            },
            Err(err) => {
                warn!(
                    "Failed to parse config file {}. Using defaults. error={}",
                    path.display(),
                    err
                );
                Self {
                    path: Some(path.to_path_buf()),
                    ..Self::default()
                }
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn to_toml_string(&self) -> String {
        self.document.to_string()
    }

    pub fn persist(&self) -> Result<(), String> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            crate::utils::ensure_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string())
            .map_err(|err| format!("failed to persist config to {}: {}", path.display(), err))
    }

    fn lookup(&self, key: &str) -> Option<&toml::Value> {
        match split_key(key) {
            (Some(section), name) => self.values.get(section)?.as_table()?.get(name),
            (None, name) => self.values.get(name),
        }
    }

    fn store(&mut self, key: &str, next: toml::Value, item: Item) {
        match split_key(key) {
            (Some(section), name) => {
                ensure_values_section(&mut self.values, section).insert(name.to_string(), next);
                let table = ensure_section_table(&mut self.document, section);
                set_table_value_preserving_decor(table, name, item);
            }
            (None, name) => {
                self.values.insert(name.to_string(), next);
                set_table_value_preserving_decor(self.document.as_table_mut(), name, item);
            }
        }
    }
}

impl ConfigStore for TomlConfigStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.lookup(key) {
            Some(toml::Value::Integer(value)) => *value,
            Some(toml::Value::Boolean(flag)) => i64::from(*flag),
            Some(toml::Value::String(text)) => text.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn get_str(&self, key: &str, default: &str) -> String {
        match self.lookup(key) {
            Some(toml::Value::String(text)) => text.clone(),
            Some(toml::Value::Integer(value)) => value.to_string(),
            Some(toml::Value::Boolean(flag)) => i64::from(*flag).to_string(),
            _ => default.to_string(),
        }
    }

    fn set_int(&mut self, key: &str, next: i64) {
        if self.lookup(key) == Some(&toml::Value::Integer(next)) {
            return;
        }
        self.store(key, toml::Value::Integer(next), value(next));
    }

    fn set_str(&mut self, key: &str, next: &str) {
        if matches!(self.lookup(key), Some(toml::Value::String(current)) if current == next) {
            return;
        }
        self.store(key, toml::Value::String(next.to_string()), value(next));
    }
}
