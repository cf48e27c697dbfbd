//! Process-wide class registry

use crate::adapter::ClassAdapter;
use crate::descriptor::ClassDescriptor;
use crate::object::Reflectable;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::OnceCell;
use polyglue_core::{GlueError, GlueResult};

/// Global class registry
static REGISTRY: OnceCell<Registry> = OnceCell::new();

/// Maps qualified class names to their descriptors
///
/// Registration is idempotent-safe: a second registration under the same
/// name fails with [`GlueError::DuplicateClass`] and leaves the registry
/// unchanged. Lookups may run concurrently with registration.
pub struct Registry {
    classes: DashMap<String, &'static ClassDescriptor>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            classes: DashMap::new(),
        }
    }

    /// Get the global registry
    pub fn global() -> &'static Registry {
        REGISTRY.get_or_init(Registry::new)
    }

    /// Register a descriptor under its qualified name
    pub fn register(
        &self,
        descriptor: &'static ClassDescriptor,
    ) -> GlueResult<&'static ClassDescriptor> {
        descriptor.validate()?;

        if let Some(parent) = descriptor.superclass().and_then(|name| self.get(name)) {
            check_inherited_fields(descriptor, parent)?;
        }

        match self.classes.entry(descriptor.name().to_string()) {
            Entry::Occupied(_) => Err(GlueError::DuplicateClass(descriptor.name().to_string())),
            Entry::Vacant(slot) => {
                slot.insert(descriptor);
                tracing::debug!(class = descriptor.name(), "Registered class");
                Ok(descriptor)
            }
        }
    }

    /// Register the descriptor of a reflectable type
    pub fn register_class<T: Reflectable>(&self) -> GlueResult<&'static ClassDescriptor> {
        T::register(self)
    }

    /// Find a class by qualified name
    pub fn lookup(&self, name: &str) -> GlueResult<&'static ClassDescriptor> {
        self.get(name)
            .ok_or_else(|| GlueError::UnknownClass(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&'static ClassDescriptor> {
        self.classes.get(name).map(|entry| *entry.value())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// All registered descriptors, ordered by name
    pub fn all(&self) -> Vec<&'static ClassDescriptor> {
        let mut classes: Vec<_> = self.classes.iter().map(|entry| *entry.value()).collect();
        classes.sort_by(|a, b| a.name().cmp(b.name()));
        classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Adapter for a registered class
    pub fn adapter(&self, name: &str) -> GlueResult<ClassAdapter<'_>> {
        Ok(ClassAdapter::new(self.lookup(name)?, self))
    }

    /// Adapter for a reflectable type, whether or not it is registered
    pub fn adapter_for<T: Reflectable>(&self) -> ClassAdapter<'_> {
        ClassAdapter::new(T::describe(), self)
    }

    /// The class followed by its registered ancestors, nearest first
    ///
    /// The walk stops at the first superclass that is not registered.
    pub fn ancestry(&self, class: &'static ClassDescriptor) -> Vec<&'static ClassDescriptor> {
        let mut chain = vec![class];
        let mut current = class;
        while let Some(parent) = current.superclass().and_then(|name| self.get(name)) {
            if chain.iter().any(|seen| seen.name() == parent.name()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Whether `class` is `ancestor` or a registered descendant of it
    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        if class == ancestor {
            return true;
        }
        match self.get(class) {
            Some(descriptor) => self
                .ancestry(descriptor)
                .iter()
                .any(|link| link.name() == ancestor || link.superclass() == Some(ancestor)),
            None => false,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// A subclass must redeclare every superclass field with the same type
fn check_inherited_fields(
    descriptor: &ClassDescriptor,
    parent: &ClassDescriptor,
) -> GlueResult<()> {
    for inherited in parent.fields() {
        match descriptor.field(inherited.name()) {
            Some(field) if field.type_tag() == inherited.type_tag() => {}
            Some(field) => {
                return Err(GlueError::InvalidDescriptor(format!(
                    "{} redeclares {}.{} as {} instead of {}",
                    descriptor.name(),
                    parent.name(),
                    inherited.name(),
                    field.type_tag(),
                    inherited.type_tag()
                )));
            }
            None => {
                return Err(GlueError::InvalidDescriptor(format!(
                    "{} does not declare inherited field {}.{}",
                    descriptor.name(),
                    parent.name(),
                    inherited.name()
                )));
            }
        }
    }
    Ok(())
}
