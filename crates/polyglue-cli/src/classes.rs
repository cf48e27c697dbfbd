//! Class listing

use anyhow::Result;
use polyglue_reflect::{ClassDescriptor, Registry};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// What a class publishes, in a printable form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    pub parameters: Vec<String>,
    pub fields: Vec<FieldSummary>,
    pub methods: Vec<String>,
    pub constructible: bool,
}

impl ClassSummary {
    pub fn of(class: &ClassDescriptor) -> Self {
        Self {
            name: class.name().to_string(),
            superclass: class.superclass().map(str::to_string),
            parameters: class.parameters().iter().map(ToString::to_string).collect(),
            fields: class
                .fields()
                .iter()
                .map(|field| FieldSummary {
                    name: field.name().to_string(),
                    type_tag: field.type_tag().to_string(),
                })
                .collect(),
            methods: class.methods().iter().map(|m| m.name().to_string()).collect(),
            constructible: class.is_constructible(),
        }
    }
}

/// Every class in `registry`, in name order
pub fn summarize(registry: &Registry) -> Vec<ClassSummary> {
    registry.all().into_iter().map(ClassSummary::of).collect()
}

pub fn render_text(classes: &[ClassSummary]) -> String {
    let mut out = String::new();
    for class in classes {
        let _ = write!(out, "{}({})", class.name, class.parameters.join(", "));
        if let Some(parent) = &class.superclass {
            let _ = write!(out, " extends {}", parent);
        }
        if !class.constructible {
            out.push_str(" [abstract]");
        }
        out.push('\n');

        for field in &class.fields {
            let _ = writeln!(out, "    {}: {}", field.name, field.type_tag);
        }
        for method in &class.methods {
            let _ = writeln!(out, "    {}()", method);
        }
    }
    out
}

/// Classes command implementation
pub fn run(json: bool) -> Result<()> {
    let registry = polyglue_client::registry()?;
    let classes = summarize(registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&classes)?);
    } else {
        print!("{}", render_text(&classes));
        println!("\n{} classes", classes.len());
    }

    Ok(())
}
