//! Ordered registry of uniquely-named entries
//!
//! Provides [`OrderedNamedRegistry`], the precedence list underneath
//! [`PropertySources`](crate::PropertySources) and interceptor chains.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;

/// Anything that reports a stable logical name
pub trait Named {
    /// Logical name, unique within a registry
    fn name(&self) -> &str;
}

/// Plain name/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    name: String,
    value: V,
}

impl<V> Entry<V> {
    /// Create new entry
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Payload reference
    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consume the entry, returning its payload
    #[inline]
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> Named for Entry<V> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Where to insert an entry relative to the existing sequence
///
/// Serialized externally tagged: `"first"`, `"last"`, `{ before = "x" }`,
/// `{ after = "x" }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Highest precedence
    First,
    /// Lowest precedence
    #[default]
    Last,
    /// Immediately before the named anchor
    Before(String),
    /// Immediately after the named anchor
    After(String),
}

/// Ordered sequence of uniquely-named entries
///
/// Front = highest precedence.
///
/// # Invariants
/// - No two entries share a name at any externally observable point
/// - Relative order only changes through an explicit operation
/// - Failed operations leave the sequence untouched
///
/// Positional operations are O(n); registries are expected to hold tens
/// of entries. There is no internal locking: callers sharing a registry
/// across threads must serialize writers themselves.
#[derive(Clone)]
pub struct OrderedNamedRegistry<T> {
    entries: Vec<T>,
}

impl<T> Default for OrderedNamedRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Named> OrderedNamedRegistry<T> {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an entry with `name` exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get entry by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Precedence rank of `name` (0 = front)
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }

    /// Names in precedence order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Named::name).collect()
    }

    /// Iterate entries in precedence order
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Entries as a slice, front first
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Add entry with highest precedence
    ///
    /// An entry with the same name is removed first, so this relocates
    /// rather than duplicates.
    pub fn add_first(&mut self, entry: T) {
        tracing::debug!(name = entry.name(), "adding entry with highest precedence");
        self.remove_if_present(entry.name());
        self.entries.insert(0, entry);
    }

    /// Add entry with lowest precedence
    ///
    /// An entry with the same name is removed first.
    pub fn add_last(&mut self, entry: T) {
        tracing::debug!(name = entry.name(), "adding entry with lowest precedence");
        self.remove_if_present(entry.name());
        self.entries.push(entry);
    }

    /// Add entry immediately before `anchor`
    ///
    /// # Errors
    /// - [`RegistryError::IllegalSelfReference`] if `entry` is named `anchor`
    /// - [`RegistryError::ReferenceNotFound`] if `anchor` is absent
    pub fn add_before(&mut self, anchor: &str, entry: T) -> Result<(), RegistryError> {
        tracing::debug!(name = entry.name(), anchor, "adding entry before anchor");
        Self::assert_legal_relative_addition(anchor, &entry)?;
        let index = self.relocate_around(anchor, &entry)?;
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Add entry immediately after `anchor`
    ///
    /// # Errors
    /// - [`RegistryError::IllegalSelfReference`] if `entry` is named `anchor`
    /// - [`RegistryError::ReferenceNotFound`] if `anchor` is absent
    pub fn add_after(&mut self, anchor: &str, entry: T) -> Result<(), RegistryError> {
        tracing::debug!(name = entry.name(), anchor, "adding entry after anchor");
        Self::assert_legal_relative_addition(anchor, &entry)?;
        let index = self.relocate_around(anchor, &entry)?;
        self.entries.insert(index + 1, entry);
        Ok(())
    }

    /// Replace the entry named `name`, keeping its rank
    ///
    /// Returns the replaced entry. `entry` may keep `name` or take a name
    /// not yet in the registry.
    ///
    /// # Errors
    /// - [`RegistryError::ReferenceNotFound`] if `name` is absent
    /// - [`RegistryError::DuplicateName`] if `entry` is named after another
    ///   existing entry
    pub fn replace(&mut self, name: &str, entry: T) -> Result<T, RegistryError> {
        tracing::debug!(name, replacement = entry.name(), "replacing entry");
        let index = self.assert_present_and_get_index(name)?;
        if entry.name() != name && self.contains(entry.name()) {
            return Err(RegistryError::DuplicateName(entry.name().to_string()));
        }
        Ok(std::mem::replace(&mut self.entries[index], entry))
    }

    /// Remove the entry named `name`
    ///
    /// Returns whether an entry was removed; absence is not an error.
    pub fn remove(&mut self, name: &str) -> bool {
        self.take(name).is_some()
    }

    /// Remove and return the entry named `name`
    pub fn take(&mut self, name: &str) -> Option<T> {
        let index = self.position(name)?;
        tracing::debug!(name, index, "removing entry");
        Some(self.entries.remove(index))
    }

    /// Insert `entry` at `position`
    ///
    /// # Errors
    /// Same as [`add_before`](Self::add_before)/[`add_after`](Self::add_after)
    /// for relative positions; `First`/`Last` never fail
    pub fn insert_at(&mut self, position: &Position, entry: T) -> Result<(), RegistryError> {
        match position {
            Position::First => self.add_first(entry),
            Position::Last => self.add_last(entry),
            Position::Before(anchor) => self.add_before(anchor, entry)?,
            Position::After(anchor) => self.add_after(anchor, entry)?,
        }
        Ok(())
    }

    /// Snapshot of the entries in precedence order
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries.clone()
    }

    fn remove_if_present(&mut self, name: &str) {
        if let Some(index) = self.position(name) {
            self.entries.remove(index);
        }
    }

    fn assert_legal_relative_addition(anchor: &str, entry: &T) -> Result<(), RegistryError> {
        if entry.name() == anchor {
            return Err(RegistryError::IllegalSelfReference(anchor.to_string()));
        }
        Ok(())
    }

    fn assert_present_and_get_index(&self, name: &str) -> Result<usize, RegistryError> {
        self.position(name)
            .ok_or_else(|| RegistryError::ReferenceNotFound(name.to_string()))
    }

    /// Validate `anchor`, drop any entry sharing `entry`'s name, and
    /// return the anchor's index after that removal.
    fn relocate_around(&mut self, anchor: &str, entry: &T) -> Result<usize, RegistryError> {
        let mut index = self.assert_present_and_get_index(anchor)?;
        if let Some(existing) = self.position(entry.name()) {
            self.entries.remove(existing);
            if existing < index {
                index -= 1;
            }
        }
        Ok(index)
    }
}

impl<T: Named> fmt::Debug for OrderedNamedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(Named::name))
            .finish()
    }
}

impl<'a, T: Named> IntoIterator for &'a OrderedNamedRegistry<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Named> FromIterator<T> for OrderedNamedRegistry<T> {
    /// Collect with `add_last` semantics: later duplicates win and move to the back
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.add_last(entry);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> Entry<u32> {
        Entry::new(name, 0)
    }

    fn registry(names: &[&str]) -> OrderedNamedRegistry<Entry<u32>> {
        names.iter().map(|n| entry(n)).collect()
    }

    #[test]
    fn new_registry_is_empty() {
        let registry: OrderedNamedRegistry<Entry<u32>> = OrderedNamedRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("a"));
    }

    #[test]
    fn add_last_preserves_insertion_order() {
        let registry = registry(&["b", "d", "f"]);
        assert_eq!(registry.names(), vec!["b", "d", "f"]);
    }

    #[test]
    fn add_first_relocates_existing() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.add_first(Entry::new("c", 7));
        assert_eq!(registry.names(), vec!["c", "a", "b"]);
        assert_eq!(registry.get("c").map(Entry::value), Some(&7));
    }

    #[test]
    fn add_before_moves_existing_entry() {
        let mut registry = registry(&["a", "b", "c", "d"]);
        registry.add_before("c", entry("a")).unwrap();
        assert_eq!(registry.names(), vec!["b", "a", "c", "d"]);

        registry.add_before("b", entry("d")).unwrap();
        assert_eq!(registry.names(), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn add_after_moves_existing_entry() {
        let mut registry = registry(&["a", "b", "c", "d"]);
        registry.add_after("c", entry("a")).unwrap();
        assert_eq!(registry.names(), vec!["b", "c", "a", "d"]);

        registry.add_after("b", entry("d")).unwrap();
        assert_eq!(registry.names(), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn failed_addition_leaves_registry_untouched() {
        let mut registry = registry(&["a", "b"]);
        let err = registry.add_before("missing", entry("a")).unwrap_err();
        assert_eq!(err, RegistryError::ReferenceNotFound("missing".to_string()));
        assert_eq!(registry.names(), vec!["a", "b"]);

        let err = registry.add_after("a", entry("a")).unwrap_err();
        assert_eq!(err, RegistryError::IllegalSelfReference("a".to_string()));
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn self_reference_checked_before_presence() {
        let mut registry = registry(&["a"]);
        let err = registry.add_before("zz", entry("zz")).unwrap_err();
        assert!(matches!(err, RegistryError::IllegalSelfReference(_)));
    }

    #[test]
    fn replace_keeps_rank_and_returns_old() {
        let mut registry = registry(&["a", "b", "c"]);
        let old = registry.replace("b", Entry::new("b2", 9)).unwrap();
        assert_eq!(old.name(), "b");
        assert_eq!(registry.names(), vec!["a", "b2", "c"]);
    }

    #[test]
    fn replace_with_same_name_swaps_value() {
        let mut registry = registry(&["a", "b"]);
        registry.replace("a", Entry::new("a", 5)).unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.get("a").map(Entry::value), Some(&5));
    }

    #[test]
    fn replace_with_colliding_name_fails_untouched() {
        let mut registry = registry(&["a", "b", "c"]);
        let err = registry.replace("c", Entry::new("a", 1)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("a".to_string()));
        assert_eq!(err.to_string(), "PropertySource named 'a' already exists");
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
        assert_eq!(registry.get("a").map(Entry::value), Some(&0));
    }

    #[test]
    fn replace_missing_fails() {
        let mut registry = registry(&["a"]);
        let err = registry.replace("bogus", entry("x")).unwrap_err();
        assert_eq!(err.to_string(), "PropertySource named 'bogus' does not exist");
        assert_eq!(registry.names(), vec!["a"]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut registry = registry(&["a", "b"]);
        assert!(registry.remove("a"));
        assert!(!registry.remove("a"));
        assert!(!registry.remove("never"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn take_returns_entry() {
        let mut registry = registry(&["a"]);
        assert_eq!(registry.take("a").map(|e| e.name().to_string()), Some("a".to_string()));
        assert!(registry.take("a").is_none());
    }

    #[test]
    fn insert_at_dispatches_on_position() {
        let mut registry = registry(&["m"]);
        registry.insert_at(&Position::First, entry("a")).unwrap();
        registry.insert_at(&Position::Last, entry("z")).unwrap();
        registry.insert_at(&Position::Before("m".into()), entry("l")).unwrap();
        registry.insert_at(&Position::After("m".into()), entry("n")).unwrap();
        assert_eq!(registry.names(), vec!["a", "l", "m", "n", "z"]);

        let err = registry.insert_at(&Position::After("q".into()), entry("r")).unwrap_err();
        assert_eq!(err.name(), "q");
    }

    #[test]
    fn position_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            a: Position,
            b: Position,
        }
        let doc: Doc = toml::from_str("a = \"first\"\nb = { before = \"x\" }\n").unwrap();
        assert_eq!(doc.a, Position::First);
        assert_eq!(doc.b, Position::Before("x".to_string()));
    }

    #[test]
    fn debug_lists_names() {
        let registry = registry(&["x", "y"]);
        assert_eq!(format!("{registry:?}"), r#"["x", "y"]"#);
    }

    #[test]
    fn collect_deduplicates() {
        let registry = registry(&["a", "b", "a"]);
        assert_eq!(registry.names(), vec!["b", "a"]);
    }
}
