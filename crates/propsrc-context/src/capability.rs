//! Composition-time capabilities
//!
//! A [`Capability`] registers the infrastructure components a feature
//! needs. [`Bootstrap`] holds the capabilities an application asked for,
//! in order, and applies them once to a [`ComponentRegistry`].

use crate::component::{ComponentDefinition, ComponentRegistry};
use crate::error::ContextError;
use indexmap::IndexMap;
use propsrc_core::{Named, OrderedNamedRegistry};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Component name of the scheduled task processor
pub const SCHEDULED_PROCESSOR_NAME: &str = "internalScheduledTaskProcessor";

/// Component kind of the scheduled task processor
pub const SCHEDULED_PROCESSOR_KIND: &str = "ScheduledTaskProcessor";

/// Where a capability was requested from, plus its attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityMetadata {
    origin: String,
    attributes: IndexMap<String, Value>,
}

impl CapabilityMetadata {
    /// Create metadata for a request originating at `origin`
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Add attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Origin of the request
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Attribute by key
    #[inline]
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A feature that registers components when enabled
pub trait Capability: Debug + Send + Sync {
    /// Unique capability name
    fn name(&self) -> &str;

    /// Register this capability's components
    ///
    /// # Errors
    /// Fails if the capability's components are already present
    fn enable(
        &self,
        registry: &mut ComponentRegistry,
        metadata: &CapabilityMetadata,
    ) -> Result<(), ContextError>;
}

/// Registers the single scheduled task processor
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulingCapability;

impl Capability for SchedulingCapability {
    fn name(&self) -> &str {
        "scheduling"
    }

    fn enable(
        &self,
        registry: &mut ComponentRegistry,
        metadata: &CapabilityMetadata,
    ) -> Result<(), ContextError> {
        if registry.contains(SCHEDULED_PROCESSOR_NAME) {
            return Err(ContextError::CapabilityConflict(
                "Only one scheduled task processor may exist within the context. \
                 Was scheduling enabled more than once?"
                    .to_string(),
            ));
        }

        tracing::info!(origin = metadata.origin(), "enabling scheduling");
        registry.register(
            SCHEDULED_PROCESSOR_NAME,
            ComponentDefinition::infrastructure(SCHEDULED_PROCESSOR_KIND),
        )
    }
}

/// A capability paired with the metadata it was requested with
#[derive(Debug, Clone)]
pub struct CapabilityRegistration {
    capability: Arc<dyn Capability>,
    metadata: CapabilityMetadata,
}

impl CapabilityRegistration {
    /// Capability reference
    #[inline]
    #[must_use]
    pub fn capability(&self) -> &Arc<dyn Capability> {
        &self.capability
    }

    /// Request metadata
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &CapabilityMetadata {
        &self.metadata
    }
}

impl Named for CapabilityRegistration {
    fn name(&self) -> &str {
        Capability::name(self.capability.as_ref())
    }
}

/// Ordered set of requested capabilities
#[derive(Debug, Default)]
pub struct Bootstrap {
    registrations: OrderedNamedRegistry<CapabilityRegistration>,
}

impl Bootstrap {
    /// Create new empty bootstrap
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a capability explicitly
    ///
    /// # Errors
    /// Returns [`ContextError::CapabilityConflict`] if the capability was
    /// already requested
    pub fn enable(
        &mut self,
        capability: Arc<dyn Capability>,
        metadata: CapabilityMetadata,
    ) -> Result<(), ContextError> {
        let name = Capability::name(capability.as_ref());
        if self.registrations.contains(name) {
            return Err(ContextError::CapabilityConflict(format!(
                "capability '{name}' already enabled (requested again from '{}')",
                metadata.origin()
            )));
        }
        self.registrations.add_last(CapabilityRegistration {
            capability,
            metadata,
        });
        Ok(())
    }

    /// Request a capability unless already requested; returns whether it was added
    pub fn enable_if_absent(&mut self, capability: Arc<dyn Capability>, metadata: CapabilityMetadata) -> bool {
        self.enable(capability, metadata).is_ok()
    }

    /// Check if a capability was requested
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.registrations.contains(name)
    }

    /// Requested capability names, in application order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.registrations.names()
    }

    /// Apply every requested capability to `registry`, in order
    ///
    /// Stops at the first failure. Returns the number applied.
    ///
    /// # Errors
    /// Propagates the first capability error
    pub fn apply(&self, registry: &mut ComponentRegistry) -> Result<usize, ContextError> {
        for registration in &self.registrations {
            tracing::debug!(capability = registration.name(), "applying capability");
            registration
                .capability
                .enable(registry, &registration.metadata)?;
        }
        Ok(self.registrations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_registers_processor() {
        let mut registry = ComponentRegistry::new();
        SchedulingCapability
            .enable(&mut registry, &CapabilityMetadata::new("AppConfig"))
            .unwrap();

        let def = registry.get(SCHEDULED_PROCESSOR_NAME).unwrap();
        assert_eq!(def.kind(), SCHEDULED_PROCESSOR_KIND);
    }

    #[test]
    fn scheduling_twice_fails() {
        let mut registry = ComponentRegistry::new();
        let metadata = CapabilityMetadata::new("AppConfig");
        SchedulingCapability.enable(&mut registry, &metadata).unwrap();

        let err = SchedulingCapability.enable(&mut registry, &metadata).unwrap_err();
        assert!(err.to_string().starts_with("Only one scheduled task processor"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn bootstrap_rejects_explicit_duplicate() {
        let mut bootstrap = Bootstrap::new();
        bootstrap
            .enable(Arc::new(SchedulingCapability), CapabilityMetadata::new("A"))
            .unwrap();

        let err = bootstrap
            .enable(Arc::new(SchedulingCapability), CapabilityMetadata::new("B"))
            .unwrap_err();
        assert!(matches!(err, ContextError::CapabilityConflict(_)));
        assert!(!bootstrap.enable_if_absent(Arc::new(SchedulingCapability), CapabilityMetadata::new("C")));
        assert_eq!(bootstrap.names(), vec!["scheduling"]);
    }

    #[test]
    fn bootstrap_applies_once() {
        let mut bootstrap = Bootstrap::new();
        assert!(bootstrap.enable_if_absent(Arc::new(SchedulingCapability), CapabilityMetadata::new("A")));

        let mut registry = ComponentRegistry::new();
        assert_eq!(bootstrap.apply(&mut registry).unwrap(), 1);
        assert!(registry.contains(SCHEDULED_PROCESSOR_NAME));

        // applying to the same registry again trips the capability's own guard
        assert!(bootstrap.apply(&mut registry).is_err());
    }

    #[test]
    fn metadata_attributes() {
        let metadata = CapabilityMetadata::new("AppConfig").with_attribute("pool_size", 4);
        assert_eq!(metadata.attribute("pool_size"), Some(&Value::from(4)));
        assert!(metadata.attribute("missing").is_none());
    }
}
