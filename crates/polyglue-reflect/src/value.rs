//! Type-erased values and declared type tags

use polyglue_core::{GlueError, GlueResult};
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Declared type of a constructor parameter or field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    String,
    List(Box<TypeTag>),
    /// Map keyed by strings
    Map(Box<TypeTag>),
    Optional(Box<TypeTag>),
    /// Another reflectable class, by qualified name
    Class(Cow<'static, str>),
    /// Untyped JSON data
    Any,
}

impl TypeTag {
    pub fn class(name: impl Into<Cow<'static, str>>) -> Self {
        TypeTag::Class(name.into())
    }

    pub fn list(inner: TypeTag) -> Self {
        TypeTag::List(Box::new(inner))
    }

    pub fn map(inner: TypeTag) -> Self {
        TypeTag::Map(Box::new(inner))
    }

    pub fn optional(inner: TypeTag) -> Self {
        TypeTag::Optional(Box::new(inner))
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::String => write!(f, "String"),
            TypeTag::List(inner) => write!(f, "List<{}>", inner),
            TypeTag::Map(inner) => write!(f, "Map<String,{}>", inner),
            TypeTag::Optional(inner) => write!(f, "{}?", inner),
            TypeTag::Class(name) => write!(f, "{}", name),
            TypeTag::Any => write!(f, "any"),
        }
    }
}

/// Host types with a known [`TypeTag`]
pub trait Typed {
    fn type_tag() -> TypeTag;
}

impl Typed for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Bool
    }
}

impl Typed for i64 {
    fn type_tag() -> TypeTag {
        TypeTag::Int
    }
}

impl Typed for f64 {
    fn type_tag() -> TypeTag {
        TypeTag::Float
    }
}

impl Typed for String {
    fn type_tag() -> TypeTag {
        TypeTag::String
    }
}

impl Typed for serde_json::Value {
    fn type_tag() -> TypeTag {
        TypeTag::Any
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::optional(T::type_tag())
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::list(T::type_tag())
    }
}

impl<T: Typed> Typed for HashMap<String, T> {
    fn type_tag() -> TypeTag {
        TypeTag::map(T::type_tag())
    }
}

impl<T: Typed + ?Sized> Typed for Arc<T> {
    fn type_tag() -> TypeTag {
        T::type_tag()
    }
}

/// A type-erased host value passed through reflective calls
///
/// The host type name is captured at construction for diagnostics.
pub struct Value {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Host type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Take the wrapped value, handing the `Value` back on a type mismatch
    pub fn downcast<T: Any>(self) -> Result<T, Value> {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(inner) => Err(Value { inner, type_name }),
        }
    }

    /// Take the wrapped value or report a host-level type mismatch for `target`
    pub fn take<T: Any>(self, target: &str) -> GlueResult<T> {
        self.downcast::<T>().map_err(|value| GlueError::TypeMismatch {
            target: target.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Positional argument reader for constructors and method thunks
#[derive(Debug)]
pub struct Args {
    context: String,
    total: usize,
    position: usize,
    values: std::vec::IntoIter<Value>,
}

impl Args {
    /// `context` names the callee in errors, e.g. `chat.User.send`
    pub fn new(context: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            context: context.into(),
            total: values.len(),
            position: 0,
            values: values.into_iter(),
        }
    }

    /// Take the next argument as `T`
    pub fn take<T: Any>(&mut self) -> GlueResult<T> {
        self.position += 1;
        let value = self.values.next().ok_or_else(|| GlueError::ArityMismatch {
            class: self.context.clone(),
            expected: self.position,
            actual: self.total,
        })?;
        value.take(&format!("{} argument {}", self.context, self.position))
    }

    /// Arguments not yet taken
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}
