//! Named component definitions assembled at composition time

use crate::error::ContextError;
use indexmap::IndexMap;

/// Who a component serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentRole {
    /// Part of the application proper
    #[default]
    Application,
    /// Registered by the framework on the application's behalf
    Infrastructure,
}

/// Definition of a component to be created by the embedding system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    kind: String,
    role: ComponentRole,
}

impl ComponentDefinition {
    /// Create application component definition
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            role: ComponentRole::Application,
        }
    }

    /// Create infrastructure component definition
    #[inline]
    #[must_use]
    pub fn infrastructure(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            role: ComponentRole::Infrastructure,
        }
    }

    /// Component kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Component role
    #[inline]
    #[must_use]
    pub fn role(&self) -> ComponentRole {
        self.role
    }
}

/// Registry of uniquely-named component definitions
///
/// Registration order is preserved.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    definitions: IndexMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under `name`
    ///
    /// # Errors
    /// Returns [`ContextError::DuplicateComponent`] if `name` is taken
    pub fn register(
        &mut self,
        name: impl Into<String>,
        definition: ComponentDefinition,
    ) -> Result<(), ContextError> {
        let name = name.into();
        if self.definitions.contains_key(&name) {
            return Err(ContextError::DuplicateComponent(name));
        }
        tracing::debug!(name = %name, kind = definition.kind(), "registering component");
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Register unless `name` is taken; returns whether it registered
    pub fn register_if_absent(&mut self, name: impl Into<String>, definition: ComponentDefinition) -> bool {
        self.register(name, definition).is_ok()
    }

    /// Check if `name` is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Get definition by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(name)
    }

    /// Remove definition
    pub fn remove(&mut self, name: &str) -> Option<ComponentDefinition> {
        self.definitions.shift_remove(name)
    }

    /// Names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    /// Number of definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
