//! Property resolution over [`PropertySources`]
//!
//! Provides [`PropertyResolver`] for typed lookups and `${key:default}`
//! placeholder expansion.

use crate::error::ResolveError;
use crate::sources::PropertySources;
use serde::de::DeserializeOwned;
use serde_json::Value;

const PLACEHOLDER_PREFIX: &str = "${";
const PLACEHOLDER_SUFFIX: &str = "}";
const VALUE_SEPARATOR: char = ':';

/// Resolves keys against property sources in precedence order
///
/// String values are placeholder-expanded on the way out. Nested
/// placeholders (`${${env}.url}`) resolve inside-out.
#[derive(Debug, Clone, Copy)]
pub struct PropertyResolver<'a> {
    sources: &'a PropertySources,
    ignore_unresolvable: bool,
}

impl<'a> PropertyResolver<'a> {
    /// Create resolver over `sources`
    #[inline]
    #[must_use]
    pub fn new(sources: &'a PropertySources) -> Self {
        Self {
            sources,
            ignore_unresolvable: false,
        }
    }

    /// Leave unresolvable placeholders in place instead of failing
    #[inline]
    #[must_use]
    pub fn ignore_unresolvable(mut self, ignore: bool) -> Self {
        self.ignore_unresolvable = ignore;
        self
    }

    /// Check if any source defines `key`
    #[inline]
    #[must_use]
    pub fn contains_property(&self, key: &str) -> bool {
        self.sources.contains_property(key)
    }

    /// Raw value of `key`, without placeholder expansion
    #[inline]
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<&'a Value> {
        self.sources.get_property(key)
    }

    /// String form of `key` with placeholders expanded
    ///
    /// # Errors
    /// Fails if a placeholder in the value cannot be resolved
    pub fn get_string(&self, key: &str) -> Result<Option<String>, ResolveError> {
        match self.get_property(key) {
            Some(value) => self.resolve_placeholders(&value_to_string(value)).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`get_string`](Self::get_string), falling back to `default`
    ///
    /// # Errors
    /// Fails if a placeholder in the value cannot be resolved
    pub fn get_string_or(&self, key: &str, default: &str) -> Result<String, ResolveError> {
        Ok(self
            .get_string(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// String form of `key`, failing when absent
    ///
    /// # Errors
    /// - [`ResolveError::MissingRequiredProperty`] if no source defines `key`
    /// - placeholder errors from the value
    pub fn get_required(&self, key: &str) -> Result<String, ResolveError> {
        self.get_string(key)?
            .ok_or_else(|| ResolveError::MissingRequiredProperty(key.to_string()))
    }

    /// Value of `key` converted to `T`
    ///
    /// String values are expanded, then parsed as JSON (so `"8080"` becomes
    /// a number) before falling back to a plain string.
    ///
    /// # Errors
    /// Fails on placeholder errors or if the value does not fit `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ResolveError> {
        let Some(value) = self.get_property(key) else {
            return Ok(None);
        };

        let converted = match value {
            Value::String(raw) => {
                let expanded = self.resolve_placeholders(raw)?;
                serde_json::from_str::<T>(&expanded)
                    .or_else(|_| serde_json::from_value::<T>(Value::String(expanded)))
            }
            other => serde_json::from_value::<T>(other.clone()),
        };

        converted.map(Some).map_err(|source| ResolveError::Conversion {
            key: key.to_string(),
            target: std::any::type_name::<T>(),
            source,
        })
    }

    /// Expand `${key}` and `${key:default}` placeholders in `text`
    ///
    /// # Errors
    /// - [`ResolveError::UnresolvablePlaceholder`] for a missing key without default
    /// - [`ResolveError::CircularPlaceholder`] when a value refers back to itself
    pub fn resolve_placeholders(&self, text: &str) -> Result<String, ResolveError> {
        let mut visiting = Vec::new();
        self.parse_string(text, &mut visiting)
    }

    fn parse_string(&self, text: &str, visiting: &mut Vec<String>) -> Result<String, ResolveError> {
        let mut result = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(PLACEHOLDER_PREFIX) {
            let after = &rest[start + PLACEHOLDER_PREFIX.len()..];
            let Some(end) = find_placeholder_end(after) else {
                // unterminated: keep literally
                break;
            };
            result.push_str(&rest[..start]);

            let placeholder = self.parse_string(&after[..end], visiting)?;
            if visiting.contains(&placeholder) {
                return Err(ResolveError::CircularPlaceholder(placeholder));
            }
            visiting.push(placeholder.clone());

            let (key, default) = match placeholder.split_once(VALUE_SEPARATOR) {
                Some((key, default)) if !self.contains_property(&placeholder) => (key, Some(default)),
                _ => (placeholder.as_str(), None),
            };

            match self.get_property(key).map(value_to_string) {
                Some(value) => result.push_str(&self.parse_string(&value, visiting)?),
                None => match default {
                    Some(default) => result.push_str(&self.parse_string(default, visiting)?),
                    None if self.ignore_unresolvable => {
                        result.push_str(PLACEHOLDER_PREFIX);
                        result.push_str(&placeholder);
                        result.push_str(PLACEHOLDER_SUFFIX);
                    }
                    None => {
                        return Err(ResolveError::UnresolvablePlaceholder {
                            placeholder: key.to_string(),
                            text: text.to_string(),
                        });
                    }
                },
            }

            visiting.pop();
            rest = &after[end + PLACEHOLDER_SUFFIX.len()..];
        }

        result.push_str(rest);
        Ok(result)
    }
}

/// Index of the suffix closing the placeholder that `text` starts inside
fn find_placeholder_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(PLACEHOLDER_PREFIX.as_bytes()) {
            depth += 1;
            i += PLACEHOLDER_PREFIX.len();
        } else if bytes[i..].starts_with(PLACEHOLDER_SUFFIX.as_bytes()) {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
            i += PLACEHOLDER_SUFFIX.len();
        } else {
            i += 1;
        }
    }
    None
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
