//! Executor resolution and bootstrap scenarios

use pretty_assertions::assert_eq;
use propsrc_context::{
    Bootstrap, CapabilityMetadata, ComponentRegistry, ContextError, ExecutorContext,
    ExecutorResolver, PropertySourceSpecification, SchedulingCapability, SpecificationExecutor,
    SCHEDULED_PROCESSOR_NAME,
};
use propsrc_core::{MapPropertySource, Position, PropertyResolver, PropertySources};
use propsrc_test_utils::{MockPropertySource, StubSpecification, StubSpecificationExecutor, STUB_KIND};
use serde_json::json;
use std::sync::Arc;

fn resolver() -> ExecutorResolver {
    let mut resolver = ExecutorResolver::with_defaults();
    resolver
        .register(STUB_KIND, || {
            Box::new(StubSpecificationExecutor) as Box<dyn SpecificationExecutor>
        })
        .unwrap();
    resolver
}

#[test]
fn stub_specification_registers_component() {
    let mut context = ExecutorContext::new();
    resolver()
        .execute(&StubSpecification::new("widget"), &mut context)
        .unwrap();

    assert_eq!(context.registry().names(), vec!["widget"]);
}

#[test]
fn invalid_specification_never_reaches_executor() {
    let mut context = ExecutorContext::new();
    let err = resolver()
        .execute(&StubSpecification::new("widget").invalid(), &mut context)
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid specification: stub 'widget' marked invalid");
    assert!(context.registry().is_empty());
}

#[test]
fn unregistered_kind_is_reported() {
    let mut context = ExecutorContext::new();
    let err = resolver()
        .execute(&StubSpecification::new("w").with_kind("mystery"), &mut context)
        .unwrap_err();
    assert!(matches!(err, ContextError::NoExecutorRegistered(kind) if kind == "mystery"));
}

#[test]
fn executor_rejects_foreign_specification() {
    let mut resolver = ExecutorResolver::new();
    resolver
        .register("property-source", || {
            Box::new(StubSpecificationExecutor) as Box<dyn SpecificationExecutor>
        })
        .unwrap();

    let spec = PropertySourceSpecification::new(MapPropertySource::empty("x"), Position::Last);
    let err = resolver.execute(&spec, &mut ExecutorContext::new()).unwrap_err();
    assert!(matches!(err, ContextError::UnsupportedSpecification { .. }));
}

#[test]
fn specifications_extend_existing_sources() {
    let mut sources = PropertySources::new();
    sources.add_last(Arc::new(MockPropertySource::new("systemEnvironment").with_property("port", 80)));
    let mut context = ExecutorContext::with_parts(ComponentRegistry::new(), sources);

    let overrides = MapPropertySource::empty("overrides").with_property("port", 8080);
    resolver()
        .execute(
            &PropertySourceSpecification::new(overrides, Position::Before("systemEnvironment".into())),
            &mut context,
        )
        .unwrap();

    let (_, sources) = context.into_parts();
    assert_eq!(sources.names(), vec!["overrides", "systemEnvironment"]);
    assert_eq!(
        PropertyResolver::new(&sources).get_property("port"),
        Some(&json!(8080))
    );
}

#[test]
fn bootstrap_and_specifications_share_one_registry() {
    let mut bootstrap = Bootstrap::new();
    bootstrap
        .enable(Arc::new(SchedulingCapability), CapabilityMetadata::new("AppConfig"))
        .unwrap();

    let mut context = ExecutorContext::new();
    bootstrap.apply(context.registry_mut()).unwrap();
    resolver()
        .execute(&StubSpecification::new("worker"), &mut context)
        .unwrap();

    assert_eq!(context.registry().names(), vec![SCHEDULED_PROCESSOR_NAME, "worker"]);

    let err = enable_scheduling_again(&mut context);
    assert_eq!(
        err.to_string(),
        "Only one scheduled task processor may exist within the context. \
         Was scheduling enabled more than once?"
    );
}

fn enable_scheduling_again(context: &mut ExecutorContext) -> ContextError {
    let mut again = Bootstrap::new();
    again
        .enable(Arc::new(SchedulingCapability), CapabilityMetadata::new("OtherConfig"))
        .unwrap();
    again.apply(context.registry_mut()).unwrap_err()
}
