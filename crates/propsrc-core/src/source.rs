//! Property source implementations
//!
//! A [`PropertySource`] is a named bag of key/value pairs. Values are
//! [`serde_json::Value`] so sources loaded from TOML, JSON or YAML and
//! sources built in memory share a single representation.

use crate::registry::Named;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Name under which the process environment is registered
pub const SYSTEM_ENVIRONMENT_PROPERTY_SOURCE_NAME: &str = "systemEnvironment";

/// Named source of configuration properties
pub trait PropertySource: Debug + Send + Sync {
    /// Logical name of this source
    fn name(&self) -> &str;

    /// Value for `key`, if this source defines it
    fn get_property(&self, key: &str) -> Option<&Value>;

    /// Check if this source defines `key`
    fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    /// All keys defined by this source
    fn property_names(&self) -> Vec<String>;
}

impl<S: PropertySource + ?Sized> Named for Arc<S> {
    fn name(&self) -> &str {
        PropertySource::name(self.as_ref())
    }
}

/// In-memory property source backed by an insertion-ordered map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapPropertySource {
    name: String,
    properties: IndexMap<String, Value>,
}

impl MapPropertySource {
    /// Create new source
    #[must_use]
    pub fn new(name: impl Into<String>, properties: IndexMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Create empty source
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, IndexMap::new())
    }

    /// Builder-style property insertion
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert property, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// Underlying map
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if source is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}

/// Snapshot of environment variables
///
/// Lookups for a dotted or dashed key fall back to its `UPPER_SNAKE`
/// spelling, so `server.port` finds `SERVER_PORT`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentPropertySource {
    name: String,
    variables: IndexMap<String, Value>,
}

impl EnvironmentPropertySource {
    /// Capture the current process environment
    #[must_use]
    pub fn capture() -> Self {
        Self::from_vars(SYSTEM_ENVIRONMENT_PROPERTY_SOURCE_NAME, std::env::vars())
    }

    /// Build from explicit variables
    pub fn from_vars<K, V>(name: impl Into<String>, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let variables = vars
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self {
            name: name.into(),
            variables,
        }
    }

    fn env_key(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, key: &str) -> Option<&Value> {
        self.variables
            .get(key)
            .or_else(|| self.variables.get(&Self::env_key(key)))
    }

    fn property_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }
}
