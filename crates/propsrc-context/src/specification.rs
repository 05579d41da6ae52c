//! Feature specifications and their executors
//!
//! A [`FeatureSpecification`] describes a piece of configuration by value;
//! a [`SpecificationExecutor`] applies it to an [`ExecutorContext`]. The
//! [`ExecutorResolver`] maps specification kinds to executor factories and
//! is filled explicitly at composition time.

use crate::component::ComponentRegistry;
use crate::error::{ContextError, InvalidSpecification};
use propsrc_core::{MapPropertySource, Position, PropertySources};
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Configuration described by value
pub trait FeatureSpecification: Debug + Send + Sync {
    /// Check that the specification is internally consistent
    ///
    /// # Errors
    /// Returns [`InvalidSpecification`] describing the problem
    fn validate(&self) -> Result<(), InvalidSpecification>;

    /// Kind used to look up the executor
    fn executor_kind(&self) -> &str;

    /// Downcast support for executors
    fn as_any(&self) -> &dyn Any;
}

/// Applies one kind of specification
pub trait SpecificationExecutor: Debug + Send + Sync {
    /// Apply `spec` to `context`
    ///
    /// # Errors
    /// Fails if `spec` is of a kind this executor does not handle, or if
    /// applying it conflicts with the context
    fn execute(
        &self,
        spec: &dyn FeatureSpecification,
        context: &mut ExecutorContext,
    ) -> Result<(), ContextError>;
}

/// State being assembled by executors
#[derive(Debug, Default)]
pub struct ExecutorContext {
    registry: ComponentRegistry,
    sources: PropertySources,
}

impl ExecutorContext {
    /// Create empty context
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context over existing state
    #[inline]
    #[must_use]
    pub fn with_parts(registry: ComponentRegistry, sources: PropertySources) -> Self {
        Self { registry, sources }
    }

    /// Component registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Mutable component registry
    #[inline]
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Property sources
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &PropertySources {
        &self.sources
    }

    /// Mutable property sources
    #[inline]
    pub fn sources_mut(&mut self) -> &mut PropertySources {
        &mut self.sources
    }

    /// Consume the context
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (ComponentRegistry, PropertySources) {
        (self.registry, self.sources)
    }
}

/// Creates a fresh executor
pub type ExecutorFactory = Arc<dyn Fn() -> Box<dyn SpecificationExecutor> + Send + Sync>;

/// Kind → executor factory table
#[derive(Default, Clone)]
pub struct ExecutorResolver {
    factories: HashMap<String, ExecutorFactory>,
}

impl Debug for ExecutorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("ExecutorResolver").field("kinds", &kinds).finish()
    }
}

impl ExecutorResolver {
    /// Create empty resolver
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create resolver with the built-in executors
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut resolver = Self::new();
        resolver.factories.insert(
            PropertySourceSpecification::KIND.to_string(),
            Arc::new(|| Box::new(PropertySourceExecutor) as Box<dyn SpecificationExecutor>),
        );
        resolver
    }

    /// Register a factory for `kind`
    ///
    /// # Errors
    /// Returns [`ContextError::DuplicateExecutor`] if `kind` is taken
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> Result<(), ContextError>
    where
        F: Fn() -> Box<dyn SpecificationExecutor> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.factories.contains_key(&kind) {
            return Err(ContextError::DuplicateExecutor(kind));
        }
        self.factories.insert(kind, Arc::new(factory));
        Ok(())
    }

    /// Check if `kind` has an executor
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Create the executor for `spec`
    ///
    /// # Errors
    /// Returns [`ContextError::NoExecutorRegistered`] for unknown kinds
    pub fn resolve(
        &self,
        spec: &dyn FeatureSpecification,
    ) -> Result<Box<dyn SpecificationExecutor>, ContextError> {
        let kind = spec.executor_kind();
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ContextError::NoExecutorRegistered(kind.to_string()))?;
        Ok(factory())
    }

    /// Validate, resolve and execute `spec`
    ///
    /// # Errors
    /// Propagates validation, resolution and execution errors
    pub fn execute(
        &self,
        spec: &dyn FeatureSpecification,
        context: &mut ExecutorContext,
    ) -> Result<(), ContextError> {
        spec.validate()?;
        let executor = self.resolve(spec)?;
        tracing::debug!(kind = spec.executor_kind(), ?executor, "executing specification");
        executor.execute(spec, context)
    }
}

/// Adds an in-memory property source at a position
#[derive(Debug, Clone)]
pub struct PropertySourceSpecification {
    source: MapPropertySource,
    position: Position,
}

impl PropertySourceSpecification {
    /// Executor kind
    pub const KIND: &'static str = "property-source";

    /// Create new specification
    #[inline]
    #[must_use]
    pub fn new(source: MapPropertySource, position: Position) -> Self {
        Self { source, position }
    }
}

impl FeatureSpecification for PropertySourceSpecification {
    fn validate(&self) -> Result<(), InvalidSpecification> {
        let name = propsrc_core::PropertySource::name(&self.source);
        if name.is_empty() {
            return Err(InvalidSpecification("property source name must not be empty".to_string()));
        }
        Ok(())
    }

    fn executor_kind(&self) -> &str {
        Self::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Executes [`PropertySourceSpecification`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertySourceExecutor;

impl SpecificationExecutor for PropertySourceExecutor {
    fn execute(
        &self,
        spec: &dyn FeatureSpecification,
        context: &mut ExecutorContext,
    ) -> Result<(), ContextError> {
        let spec = spec
            .as_any()
            .downcast_ref::<PropertySourceSpecification>()
            .ok_or_else(|| ContextError::UnsupportedSpecification {
                executor: "PropertySourceExecutor",
                kind: spec.executor_kind().to_string(),
            })?;

        context
            .sources_mut()
            .insert_at(&spec.position, Arc::new(spec.source.clone()))?;
        Ok(())
    }
}
