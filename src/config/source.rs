//! Hierarchical configuration tree.
//!
//! A [`Config`] wraps a TOML table and answers dotted-path lookups such as
//! `allocator-dumps.sample-rate`. Getters return `Ok(None)` for absent keys
//! and an error only when a present value cannot be read as the requested
//! type.

use std::time::Duration;

use toml::{Table, Value};

use crate::config::error::ConfigError;
use crate::config::units;

/// An immutable configuration subtree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    root: Table,
}

impl Config {
    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a TOML document.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let root: Table = toml::from_str(input)?;
        Ok(Self { root })
    }

    /// Wrap an existing table.
    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    /// Borrow the underlying table.
    pub fn as_table(&self) -> &Table {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Layer `self` over `fallback`.
    ///
    /// Tables are merged recursively; for any other value the receiver wins.
    pub fn with_fallback(&self, fallback: &Config) -> Config {
        let mut merged = fallback.root.clone();
        merge_tables(&mut merged, &self.root);
        Config { root: merged }
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    /// Return true if any value, including a table, exists at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Extract the subtree at `path`.
    pub fn get_config(&self, path: &str) -> Result<Option<Config>, ConfigError> {
        match self.lookup(path) {
            None => Ok(None),
            Some(Value::Table(table)) => Ok(Some(Config::from_table(table.clone()))),
            Some(other) => Err(wrong_type(path, "table", other)),
        }
    }

    pub fn get_string(&self, path: &str) -> Result<Option<String>, ConfigError> {
        self.lookup(path)
            .map(|value| scalar_to_string(path, value))
            .transpose()
    }

    pub fn get_bool(&self, path: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::Boolean(b) => Ok(Some(*b)),
            Value::String(s) => units::parse_boolean(s)
                .map(Some)
                .ok_or_else(|| malformed(path, s, "expected one of true/false/on/off/yes/no")),
            other => Err(wrong_type(path, "boolean", other)),
        }
    }

    pub fn get_int(&self, path: &str) -> Result<Option<i64>, ConfigError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::Integer(i) => Ok(Some(*i)),
            Value::String(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| malformed(path, s, "expected an integer")),
            other => Err(wrong_type(path, "integer", other)),
        }
    }

    pub fn get_double(&self, path: &str) -> Result<Option<f64>, ConfigError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::Float(f) => Ok(Some(*f)),
            Value::Integer(i) => Ok(Some(*i as f64)),
            Value::String(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| malformed(path, s, "expected a number")),
            other => Err(wrong_type(path, "number", other)),
        }
    }

    /// Read a byte size. Integers are bytes; strings may carry a unit.
    pub fn get_byte_size(&self, path: &str) -> Result<Option<i64>, ConfigError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::Integer(i) => Ok(Some(*i)),
            Value::String(s) => units::parse_byte_size(s)
                .map(Some)
                .map_err(|reason| malformed(path, s, &reason)),
            other => Err(wrong_type(path, "byte size", other)),
        }
    }

    /// Read a duration. Integers are millis; strings may carry a unit.
    pub fn get_duration(&self, path: &str) -> Result<Option<Duration>, ConfigError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::Integer(i) => u64::try_from(*i)
                .map(|millis| Some(Duration::from_millis(millis)))
                .map_err(|_| malformed(path, &i.to_string(), "durations must not be negative")),
            Value::String(s) => units::parse_duration(s)
                .map(Some)
                .map_err(|reason| malformed(path, s, &reason)),
            other => Err(wrong_type(path, "duration", other)),
        }
    }

    pub fn get_string_list(&self, path: &str) -> Result<Option<Vec<String>>, ConfigError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| scalar_to_string(path, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            other => Err(wrong_type(path, "list", other)),
        }
    }
}

fn merge_tables(base: &mut Table, overlay: &Table) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn scalar_to_string(path: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        other => Err(wrong_type(path, "string", other)),
    }
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::WrongType {
        path: path.to_string(),
        expected,
        found: found.type_str(),
    }
}

fn malformed(path: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Malformed {
        path: path.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
