//! Reflective object adapter

use crate::descriptor::{ClassDescriptor, FieldDescriptor, MethodDescriptor};
use crate::object::Instance;
use crate::registry::Registry;
use crate::value::Value;
use polyglue_core::{GlueError, GlueResult};
use std::collections::HashSet;

/// Drives instances of one class through its descriptor
///
/// An adapter accepts instances of its own class and of every registered
/// descendant. Field and method names resolve against the adapter's class
/// and its registered ancestors.
#[derive(Clone, Copy)]
pub struct ClassAdapter<'r> {
    class: &'static ClassDescriptor,
    registry: &'r Registry,
}

impl<'r> ClassAdapter<'r> {
    pub fn new(class: &'static ClassDescriptor, registry: &'r Registry) -> Self {
        Self { class, registry }
    }

    pub fn class(&self) -> &'static ClassDescriptor {
        self.class
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Build a new instance from positional arguments
    pub fn construct(&self, args: Vec<Value>) -> GlueResult<Instance> {
        let expected = self.class.arity();
        if args.len() != expected {
            return Err(GlueError::ArityMismatch {
                class: self.class.name().to_string(),
                expected,
                actual: args.len(),
            });
        }

        let constructor = self
            .class
            .constructor()
            .ok_or_else(|| GlueError::NotConstructible(self.class.name().to_string()))?;

        let object = constructor(args)?;
        tracing::trace!(class = object.class().name(), "Constructed instance");
        Ok(Instance::from_boxed(object))
    }

    /// Read a declared field
    pub fn get_field(&self, instance: &Instance, name: &str) -> GlueResult<Value> {
        self.check_instance(instance)?;
        self.resolve_field(name)?;
        instance.as_reflect().get_field(name)
    }

    /// Overwrite a declared field
    pub fn set_field(&self, instance: &mut Instance, name: &str, value: Value) -> GlueResult<()> {
        self.check_instance(instance)?;
        self.resolve_field(name)?;
        instance.as_reflect_mut().set_field(name, value)
    }

    /// Qualified name of the instance's most-derived class
    pub fn class_name(&self, instance: &Instance) -> GlueResult<&'static str> {
        self.check_instance(instance)?;
        Ok(instance.class_name())
    }

    /// Call a declared method
    ///
    /// The name must be visible from the adapter's class. The call goes to
    /// the most-derived declaration for the instance's dynamic class.
    pub fn invoke(
        &self,
        instance: &mut Instance,
        method: &str,
        args: Vec<Value>,
    ) -> GlueResult<Value> {
        self.check_instance(instance)?;
        self.resolve_method(self.class, method)?;
        let target = self.resolve_method(instance.class(), method)?;
        tracing::trace!(class = instance.class_name(), method, "Invoking method");
        (target.thunk())(instance.as_reflect_mut(), args)
    }

    /// Find a field on the class or its registered ancestors
    pub fn resolve_field(&self, name: &str) -> GlueResult<&'static FieldDescriptor> {
        self.registry
            .ancestry(self.class)
            .into_iter()
            .find_map(|class| class.field(name))
            .ok_or_else(|| GlueError::UnknownField {
                class: self.class.name().to_string(),
                field: name.to_string(),
            })
    }

    /// Every field visible through this adapter, own declarations first
    pub fn fields(&self) -> Vec<&'static FieldDescriptor> {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for class in self.registry.ancestry(self.class) {
            for field in class.fields() {
                if seen.insert(field.name()) {
                    fields.push(field);
                }
            }
        }
        fields
    }

    /// Whether `instance` may be used through this adapter
    pub fn accepts(&self, instance: &Instance) -> bool {
        let dynamic = instance.class();
        std::ptr::eq(dynamic, self.class)
            || self.registry.is_subclass_of(dynamic.name(), self.class.name())
    }

    fn check_instance(&self, instance: &Instance) -> GlueResult<()> {
        if self.accepts(instance) {
            Ok(())
        } else {
            Err(GlueError::InstanceMismatch {
                adapter: self.class.name().to_string(),
                instance: instance.class_name().to_string(),
            })
        }
    }

    fn resolve_method(
        &self,
        class: &'static ClassDescriptor,
        name: &str,
    ) -> GlueResult<&'static MethodDescriptor> {
        self.registry
            .ancestry(class)
            .into_iter()
            .find_map(|link| link.method(name))
            .ok_or_else(|| GlueError::UnknownMethod {
                class: class.name().to_string(),
                method: name.to_string(),
            })
    }
}

impl std::fmt::Debug for ClassAdapter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassAdapter")
            .field("class", &self.class.name())
            .finish_non_exhaustive()
    }
}
