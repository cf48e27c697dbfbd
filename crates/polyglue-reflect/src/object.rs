//! Reflective objects and type-erased instances

use crate::descriptor::ClassDescriptor;
use crate::registry::Registry;
use crate::value::Value;
use polyglue_core::{GlueError, GlueResult};
use std::any::Any;

/// A native object that can be driven through its class descriptor
///
/// Usually implemented with `#[derive(Reflect)]`. Hand-written
/// implementations must report field names exactly as declared in
/// [`Reflect::class`].
pub trait Reflect: Any + Send + Sync {
    /// Descriptor of the object's dynamic class
    fn class(&self) -> &'static ClassDescriptor;

    /// Read a declared field
    fn get_field(&self, name: &str) -> GlueResult<Value>;

    /// Overwrite a declared field
    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

/// Static access to a reflectable type's descriptor
pub trait Reflectable: Reflect + Sized {
    fn describe() -> &'static ClassDescriptor;

    /// Register this type's descriptor
    fn register(registry: &Registry) -> GlueResult<&'static ClassDescriptor> {
        registry.register(Self::describe())
    }
}

/// An owned, type-erased instance of some registered class
pub struct Instance {
    object: Box<dyn Reflect>,
}

impl Instance {
    pub fn new<T: Reflect>(object: T) -> Self {
        Self {
            object: Box::new(object),
        }
    }

    pub fn from_boxed(object: Box<dyn Reflect>) -> Self {
        Self { object }
    }

    /// Descriptor of the dynamic class
    pub fn class(&self) -> &'static ClassDescriptor {
        self.object.class()
    }

    pub fn class_name(&self) -> &'static str {
        self.object.class().name()
    }

    pub fn as_reflect(&self) -> &dyn Reflect {
        self.object.as_ref()
    }

    pub fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self.object.as_mut()
    }

    pub fn is<T: Reflect>(&self) -> bool {
        self.object.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.object.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.object.as_any_mut().downcast_mut::<T>()
    }

    /// Unwrap into the concrete native type
    pub fn downcast<T: Reflect>(self) -> GlueResult<T> {
        let class = self.class_name();
        self.object
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| GlueError::TypeMismatch {
                target: class.to_string(),
                expected: std::any::type_name::<T>().to_string(),
                actual: class.to_string(),
            })
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class_name())
            .finish_non_exhaustive()
    }
}

/// Downcast the receiver of a method thunk to its concrete type
pub fn receiver<'a, T: Reflect>(
    object: &'a mut dyn Reflect,
    method: &str,
) -> GlueResult<&'a mut T> {
    let class = object.class().name();
    object
        .as_any_mut()
        .downcast_mut::<T>()
        .ok_or_else(|| GlueError::TypeMismatch {
            target: method.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: class.to_string(),
        })
}
