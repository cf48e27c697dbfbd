#![allow(non_snake_case)]

use super::*;
use crate::Reflectable;
use crate::test_support::{Cat, Collar, Pet, Rock};

fn noop(_object: &mut dyn Reflect, _args: Vec<Value>) -> GlueResult<Value> {
    Ok(Value::new(()))
}

// ClassDescriptorBuilder tests

#[test]
fn ClassDescriptorBuilder___build___keeps_declaration_order() {
    let descriptor = ClassDescriptor::builder("chat.User")
        .param(TypeTag::class("chat.Client"))
        .param(TypeTag::String)
        .field("client", TypeTag::class("chat.Client"))
        .field("id", TypeTag::String)
        .build()
        .unwrap();

    assert_eq!(descriptor.name(), "chat.User");
    assert_eq!(descriptor.arity(), 2);
    let names: Vec<_> = descriptor.fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["client", "id"]);
}

#[test]
fn ClassDescriptorBuilder___duplicate_field___returns_invalid_descriptor() {
    let result = ClassDescriptor::builder("zoo.Twin")
        .field("name", TypeTag::String)
        .field("name", TypeTag::Int)
        .build();

    assert!(matches!(result, Err(GlueError::InvalidDescriptor(_))));
}

#[test]
fn ClassDescriptorBuilder___empty_segment___returns_invalid_descriptor() {
    let result = ClassDescriptor::builder("zoo..Pet").build();

    assert!(matches!(result, Err(GlueError::InvalidDescriptor(_))));
}

#[test]
fn ClassDescriptorBuilder___extends_itself___returns_invalid_descriptor() {
    let result = ClassDescriptor::builder("zoo.Loop").extends("zoo.Loop").build();

    assert!(matches!(result, Err(GlueError::InvalidDescriptor(_))));
}

#[test]
fn ClassDescriptorBuilder___finish___skips_validation() {
    let descriptor = ClassDescriptor::builder("zoo.Twin")
        .field("name", TypeTag::String)
        .field("name", TypeTag::String)
        .finish();

    assert!(descriptor.validate().is_err());
}

// ClassDescriptor tests

#[test]
fn ClassDescriptor___method___returns_first_declaration() {
    let descriptor = ClassDescriptor::builder("zoo.Overloaded")
        .method("speak", noop)
        .method("speak", noop)
        .method("sleep", noop)
        .finish();

    assert_eq!(descriptor.methods().len(), 3);
    assert!(std::ptr::eq(
        descriptor.method("speak").unwrap(),
        &descriptor.methods()[0]
    ));
    assert!(descriptor.method("fly").is_none());
}

#[test]
fn ClassDescriptor___simple_name___returns_last_segment() {
    assert_eq!(Cat::describe().simple_name(), "Cat");
    assert_eq!(ClassDescriptor::builder("Plain").finish().simple_name(), "Plain");
}

#[test]
fn ClassDescriptor___superclass___reports_declared_parent() {
    assert_eq!(Cat::describe().superclass(), Some("zoo.Pet"));
    assert_eq!(Pet::describe().superclass(), None);
}

#[test]
fn ClassDescriptor___is_constructible___reflects_constructor() {
    assert!(Pet::describe().is_constructible());
    assert!(!Rock::describe().is_constructible());
}

#[test]
fn ClassDescriptor___eq___compares_names() {
    let a = ClassDescriptor::builder("zoo.Pet").finish();
    let b = ClassDescriptor::builder("zoo.Pet")
        .field("name", TypeTag::String)
        .finish();

    assert_eq!(a, b);
    assert_ne!(a, ClassDescriptor::builder("zoo.Cat").finish());
}

#[test]
fn ClassDescriptor___debug___hides_function_pointers() {
    let debug = format!("{:?}", Pet::describe());

    assert!(debug.contains("zoo.Pet"));
    assert!(debug.contains("constructible: true"));
}

#[test]
fn ClassDescriptor___leak___returns_static_reference() {
    let leaked: &'static ClassDescriptor = ClassDescriptor::builder("zoo.Leaked").finish().leak();

    assert_eq!(leaked.name(), "zoo.Leaked");
}

// Embedding tests

#[test]
fn Embedding___wrap___stores_native_value() {
    let embedding = Collar::describe().embedding().unwrap();

    let value = embedding
        .wrap(Instance::new(Collar { tag: "red".into() }))
        .unwrap();

    assert_eq!(value.downcast_ref::<Collar>().map(|c| c.tag.as_str()), Some("red"));
}

#[test]
fn Embedding___wrap_optional___stores_some_or_none() {
    let embedding = Collar::describe().embedding().unwrap();

    let some = embedding.wrap_optional(Some(Instance::new(Collar::default()))).unwrap();
    let none = embedding.wrap_optional(None).unwrap();

    assert!(some.downcast_ref::<Option<Collar>>().unwrap().is_some());
    assert!(none.downcast_ref::<Option<Collar>>().unwrap().is_none());
}

#[test]
fn Embedding___wrap_other_class___returns_type_mismatch() {
    let embedding = Collar::describe().embedding().unwrap();

    let result = embedding.wrap(Instance::new(Rock::default()));

    assert!(matches!(result, Err(GlueError::TypeMismatch { .. })));
}

#[test]
fn Embedding___view___sees_plain_and_optional_values() {
    let embedding = Collar::describe().embedding().unwrap();

    let plain = Value::new(Collar { tag: "a".into() });
    let empty = Value::new(None::<Collar>);
    let other = Value::new(3_i64);

    assert_eq!(
        embedding.view(&plain).flatten().map(|object| object.class().name()),
        Some("zoo.Collar")
    );
    assert!(matches!(embedding.view(&empty), Some(None)));
    assert!(embedding.view(&other).is_none());
}

#[test]
fn ClassDescriptor___without_embedding___reports_none() {
    assert!(Pet::describe().embedding().is_none());
}
