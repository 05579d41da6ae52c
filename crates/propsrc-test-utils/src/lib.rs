//! Testing utilities for the propsrc workspace
//!
//! Shared test helpers and fixtures.

#![allow(missing_docs)]

use indexmap::IndexMap;
use parking_lot::Mutex;
use propsrc_context::{
    ComponentDefinition, ContextError, ExecutorContext, FeatureSpecification,
    InvalidSpecification, Invocation, InvocationError, SpecificationExecutor, Target,
};
use propsrc_core::PropertySource;
use serde_json::Value;
use std::any::Any;

/// In-memory property source for tests
#[derive(Debug, Clone, Default)]
pub struct MockPropertySource {
    name: String,
    properties: IndexMap<String, Value>,
}

impl MockPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl PropertySource for MockPropertySource {
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

pub const STUB_KIND: &str = "stub";

/// Specification that registers one component named after it
#[derive(Debug, Clone)]
pub struct StubSpecification {
    pub name: String,
    pub kind: String,
    pub valid: bool,
}

impl StubSpecification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: STUB_KIND.to_string(),
            valid: true,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }
}

impl FeatureSpecification for StubSpecification {
    fn validate(&self) -> Result<(), InvalidSpecification> {
        if self.valid {
            Ok(())
        } else {
            Err(InvalidSpecification(format!("stub '{}' marked invalid", self.name)))
        }
    }

    fn executor_kind(&self) -> &str {
        &self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StubSpecificationExecutor;

impl SpecificationExecutor for StubSpecificationExecutor {
    fn execute(
        &self,
        spec: &dyn FeatureSpecification,
        context: &mut ExecutorContext,
    ) -> Result<(), ContextError> {
        let stub = spec
            .as_any()
            .downcast_ref::<StubSpecification>()
            .ok_or_else(|| ContextError::UnsupportedSpecification {
                executor: "StubSpecificationExecutor",
                kind: spec.executor_kind().to_string(),
            })?;
        context
            .registry_mut()
            .register(stub.name.clone(), ComponentDefinition::new("Stub"))
    }
}

#[derive(Debug, Default)]
struct TestBeanState {
    name: Option<String>,
    age: i64,
}

/// Bean with a name and an age
#[derive(Debug, Default)]
pub struct TestBean {
    state: Mutex<TestBeanState>,
}

impl TestBean {
    pub const TYPE: &'static str = "TestBean";

    pub fn new(name: &str, age: i64) -> Self {
        Self {
            state: Mutex::new(TestBeanState {
                name: Some(name.to_string()),
                age,
            }),
        }
    }
}

impl Target for TestBean {
    fn type_name(&self) -> &str {
        Self::TYPE
    }

    fn methods(&self) -> Vec<String> {
        ["getName", "setName", "getAge", "setAge", "absquatulate"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError> {
        let mut state = self.state.lock();
        match invocation.method() {
            "getName" => Ok(state.name.clone().map_or(Value::Null, Value::String)),
            "setName" => {
                state.name = invocation.arg(0).and_then(Value::as_str).map(ToString::to_string);
                Ok(Value::Null)
            }
            "getAge" => Ok(Value::from(state.age)),
            "setAge" => {
                state.age = invocation.arg(0).and_then(Value::as_i64).unwrap_or_default();
                Ok(Value::Null)
            }
            "absquatulate" => Ok(Value::Null),
            other => Err(InvocationError::no_such_method(Self::TYPE, other)),
        }
    }
}

/// Target whose methods fail or request rollback on demand
#[derive(Debug, Clone, Copy, Default)]
pub struct Rollback;

impl Rollback {
    pub const TYPE: &'static str = "Rollback";
}

impl Target for Rollback {
    fn type_name(&self) -> &str {
        Self::TYPE
    }

    fn methods(&self) -> Vec<String> {
        vec!["echoException".to_string(), "rollbackOnly".to_string()]
    }

    fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError> {
        match invocation.method() {
            "echoException" => match invocation.arg(0).and_then(Value::as_str) {
                Some(kind) => Err(InvocationError::new(kind, "echoed")),
                None => Ok(Value::Null),
            },
            "rollbackOnly" => {
                invocation.set_rollback_only();
                Ok(Value::Null)
            }
            other => Err(InvocationError::no_such_method(Self::TYPE, other)),
        }
    }
}

/// Target whose methods are matched by nothing in the standard fixtures
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainBean;

impl Target for PlainBean {
    fn type_name(&self) -> &str {
        "PlainBean"
    }

    fn methods(&self) -> Vec<String> {
        vec!["run".to_string()]
    }

    fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError> {
        match invocation.method() {
            "run" => Ok(Value::Bool(true)),
            other => Err(InvocationError::no_such_method("PlainBean", other)),
        }
    }
}
