//! Class descriptors: the metadata a host needs to drive a native class

use crate::object::{Instance, Reflect};
use crate::value::{TypeTag, Value};
use polyglue_core::{GlueError, GlueResult};
use std::borrow::Cow;
use std::collections::HashSet;

/// Builds a fresh object from positional constructor arguments
pub type Constructor = fn(Vec<Value>) -> GlueResult<Box<dyn Reflect>>;

/// Calls a named method on an object with positional arguments
pub type MethodThunk = fn(&mut dyn Reflect, Vec<Value>) -> GlueResult<Value>;

/// Moves instances of one class in and out of field values
///
/// A field tagged `Class(name)` holds the native type itself, or an
/// `Option` of it, so the loader needs the class's help to wrap a freshly
/// built instance and to look inside a stored one.
#[derive(Clone, Copy)]
pub struct Embedding {
    wrap: fn(Instance) -> GlueResult<Value>,
    wrap_optional: fn(Option<Instance>) -> GlueResult<Value>,
    view: fn(&Value) -> Option<Option<&dyn Reflect>>,
}

impl Embedding {
    pub fn of<T: Reflect>() -> Self {
        Self {
            wrap: |instance| instance.downcast::<T>().map(Value::new),
            wrap_optional: |instance| match instance {
                Some(instance) => instance.downcast::<T>().map(|object| Value::new(Some(object))),
                None => Ok(Value::new(None::<T>)),
            },
            view: view::<T>,
        }
    }

    /// A field value holding `instance`
    pub fn wrap(&self, instance: Instance) -> GlueResult<Value> {
        (self.wrap)(instance)
    }

    /// An optional field value holding `instance`, or nothing
    pub fn wrap_optional(&self, instance: Option<Instance>) -> GlueResult<Value> {
        (self.wrap_optional)(instance)
    }

    /// The object inside a plain or optional field value
    ///
    /// `None` when the value holds neither shape; `Some(None)` for an empty
    /// optional.
    pub fn view<'v>(&self, value: &'v Value) -> Option<Option<&'v dyn Reflect>> {
        (self.view)(value)
    }
}

fn view<T: Reflect>(value: &Value) -> Option<Option<&dyn Reflect>> {
    if let Some(object) = value.downcast_ref::<T>() {
        return Some(Some(object as &dyn Reflect));
    }
    value
        .downcast_ref::<Option<T>>()
        .map(|object| object.as_ref().map(|object| object as &dyn Reflect))
}

impl std::fmt::Debug for Embedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedding").finish_non_exhaustive()
    }
}

/// A named, typed field exposed to hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    type_tag: TypeTag,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }
}

/// A named method and the thunk that invokes it
#[derive(Clone)]
pub struct MethodDescriptor {
    name: Cow<'static, str>,
    invoke: MethodThunk,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, invoke: MethodThunk) -> Self {
        Self {
            name: name.into(),
            invoke,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thunk(&self) -> MethodThunk {
        self.invoke
    }
}

impl std::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Reflective description of a native class
///
/// Descriptors are immutable once built. They are usually leaked to
/// `'static` and shared by the registry, adapters and every instance of the
/// class. Two descriptors are equal when their qualified names are equal.
#[derive(Clone)]
pub struct ClassDescriptor {
    name: Cow<'static, str>,
    superclass: Option<Cow<'static, str>>,
    parameters: Vec<TypeTag>,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    constructor: Option<Constructor>,
    embedding: Option<Embedding>,
}

impl ClassDescriptor {
    /// Start describing the class with the given qualified name
    pub fn builder(name: impl Into<Cow<'static, str>>) -> ClassDescriptorBuilder {
        ClassDescriptorBuilder {
            descriptor: ClassDescriptor {
                name: name.into(),
                superclass: None,
                parameters: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                constructor: None,
                embedding: None,
            },
        }
    }

    /// Dotted qualified name, e.g. `chat.event.Message`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last segment of the qualified name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Constructor parameter types, in positional order
    pub fn parameters(&self) -> &[TypeTag] {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Fields declared directly on this class, including redeclared
    /// superclass fields
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// First method declared with `name`
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name() == name)
    }

    pub fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// How instances are stored in fields of other classes, if they can be
    pub fn embedding(&self) -> Option<Embedding> {
        self.embedding
    }

    /// Check the descriptor is well formed
    pub fn validate(&self) -> GlueResult<()> {
        if self.name.is_empty() || self.name.split('.').any(str::is_empty) {
            return Err(GlueError::InvalidDescriptor(format!(
                "'{}' is not a valid qualified class name",
                self.name
            )));
        }

        if self.superclass() == Some(self.name()) {
            return Err(GlueError::InvalidDescriptor(format!(
                "{} cannot extend itself",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name()) {
                return Err(GlueError::InvalidDescriptor(format!(
                    "{} declares field '{}' more than once",
                    self.name,
                    field.name()
                )));
            }
        }

        Ok(())
    }

    /// Move the descriptor to the heap for the rest of the process
    pub fn leak(self) -> &'static ClassDescriptor {
        Box::leak(Box::new(self))
    }
}

impl PartialEq for ClassDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ClassDescriptor {}

impl std::fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("superclass", &self.superclass)
            .field("parameters", &self.parameters)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// Builder for [`ClassDescriptor`]
#[derive(Debug)]
pub struct ClassDescriptorBuilder {
    descriptor: ClassDescriptor,
}

impl ClassDescriptorBuilder {
    pub fn extends(mut self, superclass: impl Into<Cow<'static, str>>) -> Self {
        self.descriptor.superclass = Some(superclass.into());
        self
    }

    /// Append a constructor parameter
    pub fn param(mut self, type_tag: TypeTag) -> Self {
        self.descriptor.parameters.push(type_tag);
        self
    }

    pub fn field(mut self, name: impl Into<Cow<'static, str>>, type_tag: TypeTag) -> Self {
        self.descriptor
            .fields
            .push(FieldDescriptor::new(name, type_tag));
        self
    }

    pub fn method(mut self, name: impl Into<Cow<'static, str>>, invoke: MethodThunk) -> Self {
        self.descriptor
            .methods
            .push(MethodDescriptor::new(name, invoke));
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.descriptor.constructor = Some(constructor);
        self
    }

    pub fn embedding(mut self, embedding: Embedding) -> Self {
        self.descriptor.embedding = Some(embedding);
        self
    }

    /// Finish and validate the descriptor
    pub fn build(self) -> GlueResult<ClassDescriptor> {
        self.descriptor.validate()?;
        Ok(self.descriptor)
    }

    /// Finish without validating
    ///
    /// For generated code that checked the declaration at compile time. The
    /// registry validates again on registration.
    pub fn finish(self) -> ClassDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
#[path = "descriptor/descriptor_tests.rs"]
mod descriptor_tests;
