//! polyglue-reflect - Class descriptors and reflective object adapters
//!
//! Every reflectable class publishes one immutable [`ClassDescriptor`]:
//! its qualified name, superclass, constructor parameters, fields and
//! methods. A [`Registry`] maps qualified names to descriptors, and a
//! [`ClassAdapter`] uses a descriptor to construct instances and read or
//! write their fields without knowing the concrete Rust type.
//!
//! Descriptors are normally produced by `#[derive(Reflect)]` from the
//! `polyglue-macros` crate.

mod adapter;
mod descriptor;
pub mod json;
mod object;
mod registry;
mod value;

#[cfg(test)]
mod test_support;

pub use adapter::ClassAdapter;
pub use descriptor::{
    ClassDescriptor, ClassDescriptorBuilder, Constructor, Embedding, FieldDescriptor,
    MethodDescriptor, MethodThunk,
};
pub use object::{Instance, Reflect, Reflectable, receiver};
pub use registry::Registry;
pub use value::{Args, TypeTag, Typed, Value};

/// Re-exported for generated code
#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
    pub use polyglue_core::{GlueError, GlueResult};
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ClassAdapter, ClassDescriptor, Instance, Reflect, Reflectable, Registry, TypeTag, Typed,
        Value,
    };
}
