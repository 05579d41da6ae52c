//! Targets whose instance is obtained per call

use super::{Invocation, Target};
use crate::error::InvocationError;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::fmt::{self, Debug};
use std::sync::Arc;

type TargetFactory = Box<dyn Fn() -> Arc<dyn Target> + Send + Sync>;

/// Creates the real target on first invocation
///
/// Type name and methods are declared up front so pointcuts can be
/// evaluated without forcing initialization.
pub struct LazyInitTarget {
    type_name: String,
    methods: Vec<String>,
    factory: TargetFactory,
    instance: OnceCell<Arc<dyn Target>>,
}

impl LazyInitTarget {
    /// Create lazy target
    #[must_use]
    pub fn new<F>(type_name: impl Into<String>, methods: &[&str], factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Target> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            methods: methods.iter().map(ToString::to_string).collect(),
            factory: Box::new(factory),
            instance: OnceCell::new(),
        }
    }

    /// Check if the real target exists yet
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }

    fn instance(&self) -> &Arc<dyn Target> {
        self.instance.get_or_init(|| {
            tracing::debug!(target_type = %self.type_name, "initializing lazy target");
            (self.factory)()
        })
    }
}

impl Debug for LazyInitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyInitTarget")
            .field("type_name", &self.type_name)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl Target for LazyInitTarget {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn methods(&self) -> Vec<String> {
        self.methods.clone()
    }

    fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError> {
        self.instance().invoke(invocation)
    }
}

/// Creates a fresh target for every invocation
pub struct PrototypeTarget {
    type_name: String,
    methods: Vec<String>,
    factory: TargetFactory,
}

impl PrototypeTarget {
    /// Create prototype target
    #[must_use]
    pub fn new<F>(type_name: impl Into<String>, methods: &[&str], factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Target> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            methods: methods.iter().map(ToString::to_string).collect(),
            factory: Box::new(factory),
        }
    }
}

impl Debug for PrototypeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrototypeTarget")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl Target for PrototypeTarget {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn methods(&self) -> Vec<String> {
        self.methods.clone()
    }

    fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError> {
        (self.factory)().invoke(invocation)
    }
}
