//! JSON loading and dumping built on the adapter surface
//!
//! Conversion is driven by each field's [`TypeTag`]. Supported tags are
//! `bool`, `int`, `float`, `String`, `any`, `List<String>`, registered
//! classes that carry an [`Embedding`](crate::Embedding), and optionals of
//! all of those. Fields with other tags are skipped when dumping and
//! rejected when a payload tries to load them.
//!
//! A nested class is built with its no-argument constructor and filled
//! from the nested JSON object.

use crate::adapter::ClassAdapter;
use crate::descriptor::{Embedding, FieldDescriptor};
use crate::object::{Instance, Reflect};
use crate::registry::Registry;
use crate::value::{TypeTag, Value};
use polyglue_core::{GlueError, GlueResult};
use serde_json::{Map, Value as JsonValue};
use std::any::Any;

/// Fill `instance` from a JSON object
///
/// Keys that match no visible field are ignored. Fields absent from the
/// payload keep their current value.
pub fn load(
    adapter: &ClassAdapter<'_>,
    instance: &mut Instance,
    source: &JsonValue,
) -> GlueResult<()> {
    let object = source.as_object().ok_or_else(|| {
        GlueError::Serialization(format!(
            "expected a JSON object for {}, got {}",
            adapter.class().name(),
            json_kind(source)
        ))
    })?;

    for field in adapter.fields() {
        if let Some(raw) = object.get(field.name()) {
            let value = from_json(adapter.registry(), field, raw)?;
            adapter.set_field(instance, field.name(), value)?;
        }
    }

    Ok(())
}

/// Construct an instance with `args` and fill it from `source`
pub fn construct_from(
    adapter: &ClassAdapter<'_>,
    args: Vec<Value>,
    source: &JsonValue,
) -> GlueResult<Instance> {
    let mut instance = adapter.construct(args)?;
    load(adapter, &mut instance, source)?;
    Ok(instance)
}

/// Render the JSON-convertible fields of `instance` as an object
pub fn dump(adapter: &ClassAdapter<'_>, instance: &Instance) -> GlueResult<JsonValue> {
    adapter.class_name(instance)?;
    dump_object(adapter, instance.as_reflect())
}

fn dump_object(adapter: &ClassAdapter<'_>, object: &dyn Reflect) -> GlueResult<JsonValue> {
    let mut out = Map::new();
    for field in adapter.fields() {
        let value = object.get_field(field.name())?;
        if let Some(json) = to_json(adapter.registry(), field.type_tag(), &value)? {
            out.insert(field.name().to_string(), json);
        }
    }
    Ok(JsonValue::Object(out))
}

fn from_json(registry: &Registry, field: &FieldDescriptor, raw: &JsonValue) -> GlueResult<Value> {
    let mismatch = || GlueError::TypeMismatch {
        target: field.name().to_string(),
        expected: field.type_tag().to_string(),
        actual: json_kind(raw).to_string(),
    };

    let converted = match field.type_tag() {
        TypeTag::Bool => raw.as_bool().map(Value::new),
        TypeTag::Int => raw.as_i64().map(Value::new),
        TypeTag::Float => raw.as_f64().map(Value::new),
        TypeTag::String => raw.as_str().map(|s| Value::new(s.to_string())),
        TypeTag::Any => Some(Value::new(raw.clone())),
        TypeTag::List(inner) if **inner == TypeTag::String => string_list(raw).map(Value::new),
        TypeTag::Class(name) if raw.is_object() => {
            let (embedding, instance) = load_nested(registry, name, raw)?;
            return embedding.wrap(instance);
        }
        TypeTag::Optional(inner) => match inner.as_ref() {
            TypeTag::Bool => optional(raw, JsonValue::as_bool),
            TypeTag::Int => optional(raw, JsonValue::as_i64),
            TypeTag::Float => optional(raw, JsonValue::as_f64),
            TypeTag::String => optional(raw, |v| v.as_str().map(str::to_string)),
            TypeTag::Any => optional(raw, |v| Some(v.clone())),
            TypeTag::Class(name) if raw.is_null() => {
                return embedding_of(registry, name)?.wrap_optional(None);
            }
            TypeTag::Class(name) if raw.is_object() => {
                let (embedding, instance) = load_nested(registry, name, raw)?;
                return embedding.wrap_optional(Some(instance));
            }
            _ => None,
        },
        _ => None,
    };

    converted.ok_or_else(mismatch)
}

fn embedding_of(registry: &Registry, class: &str) -> GlueResult<Embedding> {
    registry.lookup(class)?.embedding().ok_or_else(|| {
        GlueError::InvalidDescriptor(format!("{} cannot be stored in a field", class))
    })
}

fn load_nested(
    registry: &Registry,
    class: &str,
    raw: &JsonValue,
) -> GlueResult<(Embedding, Instance)> {
    let embedding = embedding_of(registry, class)?;
    let adapter = registry.adapter(class)?;
    let instance = construct_from(&adapter, Vec::new(), raw)?;
    Ok((embedding, instance))
}

fn optional<T: Any + Send + Sync>(
    raw: &JsonValue,
    read: impl Fn(&JsonValue) -> Option<T>,
) -> Option<Value> {
    if raw.is_null() {
        Some(Value::new(None::<T>))
    } else {
        read(raw).map(|inner| Value::new(Some(inner)))
    }
}

fn string_list(raw: &JsonValue) -> Option<Vec<String>> {
    raw.as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn to_json(registry: &Registry, tag: &TypeTag, value: &Value) -> GlueResult<Option<JsonValue>> {
    let nested = match tag {
        TypeTag::Class(name) => Some(name),
        TypeTag::Optional(inner) => match inner.as_ref() {
            TypeTag::Class(name) => Some(name),
            _ => None,
        },
        _ => None,
    };

    match nested {
        Some(class) => nested_to_json(registry, class, value),
        None => Ok(scalar_to_json(tag, value)),
    }
}

fn nested_to_json(
    registry: &Registry,
    class: &str,
    value: &Value,
) -> GlueResult<Option<JsonValue>> {
    let Some(embedding) = registry.get(class).and_then(|c| c.embedding()) else {
        return Ok(None);
    };
    match embedding.view(value) {
        Some(Some(object)) => dump_object(&registry.adapter(class)?, object).map(Some),
        Some(None) => Ok(Some(JsonValue::Null)),
        None => Ok(None),
    }
}

fn scalar_to_json(tag: &TypeTag, value: &Value) -> Option<JsonValue> {
    match tag {
        TypeTag::Bool => value.downcast_ref::<bool>().map(|v| JsonValue::from(*v)),
        TypeTag::Int => value.downcast_ref::<i64>().map(|v| JsonValue::from(*v)),
        TypeTag::Float => value.downcast_ref::<f64>().map(|v| JsonValue::from(*v)),
        TypeTag::String => value.downcast_ref::<String>().map(|v| JsonValue::from(v.as_str())),
        TypeTag::Any => value.downcast_ref::<JsonValue>().cloned(),
        TypeTag::List(inner) if **inner == TypeTag::String => value
            .downcast_ref::<Vec<String>>()
            .map(|v| JsonValue::from(v.clone())),
        TypeTag::Optional(inner) => match inner.as_ref() {
            TypeTag::Bool => optional_to_json::<bool>(value),
            TypeTag::Int => optional_to_json::<i64>(value),
            TypeTag::Float => optional_to_json::<f64>(value),
            TypeTag::String => optional_to_json::<String>(value),
            TypeTag::Any => optional_to_json::<JsonValue>(value),
            _ => None,
        },
        _ => None,
    }
}

fn optional_to_json<T>(value: &Value) -> Option<JsonValue>
where
    T: Any + Clone + Into<JsonValue>,
{
    value
        .downcast_ref::<Option<T>>()
        .map(|inner| inner.clone().map_or(JsonValue::Null, Into::into))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => "int",
        JsonValue::Number(_) => "float",
        JsonValue::String(_) => "String",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
