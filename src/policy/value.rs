//! Declarative configuration values and the deep-merge operation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SanitizeError, SanitizeResult};

/// A policy configuration value: a scalar, a list, or a map.
///
/// Every branch in policy construction and merging dispatches on this
/// variant tag. JSON policy input deserializes into it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<ConfigValue>),
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// An empty map, the neutral base for [`merge`].
    pub fn empty_map() -> Self {
        ConfigValue::Map(BTreeMap::new())
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Fetch a key from a map value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|map| map.get(key))
    }
}

/// Returns a new map containing the result of deeply merging `overrides`
/// into `base`. Neither argument is modified.
///
/// For each key present in either map:
/// - both values maps: merged recursively; an empty base map short-circuits
///   to a copy of the override map;
/// - override value is a list: the merged value is that list with set
///   semantics (duplicates dropped, first occurrence wins); the override
///   replaces the base value entirely, it is never a union;
/// - otherwise the override scalar replaces the base value;
/// - keys absent from `overrides` copy the base value.
///
/// Errors with [`SanitizeError::Config`] only when either argument is not
/// map-shaped.
pub fn merge(base: &ConfigValue, overrides: &ConfigValue) -> SanitizeResult<ConfigValue> {
    let base_map = base
        .as_map()
        .ok_or_else(|| SanitizeError::Config("merge base must be a map".to_string()))?;
    let override_map = overrides
        .as_map()
        .ok_or_else(|| SanitizeError::Config("merge overrides must be a map".to_string()))?;

    let mut merged = BTreeMap::new();

    for (key, old) in base_map {
        match override_map.get(key) {
            Some(new) => {
                merged.insert(key.clone(), merge_value(old, new)?);
            }
            None => {
                merged.insert(key.clone(), old.clone());
            }
        }
    }
    for (key, new) in override_map {
        if !base_map.contains_key(key) {
            merged.insert(key.clone(), normalize_override(new));
        }
    }

    Ok(ConfigValue::Map(merged))
}

fn merge_value(old: &ConfigValue, new: &ConfigValue) -> SanitizeResult<ConfigValue> {
    match (old, new) {
        (ConfigValue::Map(old_map), ConfigValue::Map(_)) => {
            if old_map.is_empty() {
                Ok(new.clone())
            } else {
                merge(old, new)
            }
        }
        (_, ConfigValue::List(list)) => Ok(ConfigValue::List(dedup(list))),
        _ => Ok(new.clone()),
    }
}

fn normalize_override(value: &ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::List(list) => ConfigValue::List(dedup(list)),
        other => other.clone(),
    }
}

fn dedup(list: &[ConfigValue]) -> Vec<ConfigValue> {
    let mut out: Vec<ConfigValue> = Vec::with_capacity(list.len());
    for item in list {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
