//! Hand-written reflectable classes shared by unit tests

use crate::descriptor::{ClassDescriptor, Embedding};
use crate::object::{Reflect, Reflectable, receiver};
use crate::value::{Args, TypeTag, Value};
use once_cell::sync::OnceCell;
use polyglue_core::{GlueError, GlueResult};
use std::any::Any;
use std::collections::HashMap;

fn unknown(class: &str, field: &str) -> GlueError {
    GlueError::UnknownField {
        class: class.to_string(),
        field: field.to_string(),
    }
}

macro_rules! any_impls {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
            self
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pet {
    pub name: String,
    pub age: i64,
}

impl Pet {
    fn greet(object: &mut dyn Reflect, _args: Vec<Value>) -> GlueResult<Value> {
        let pet = receiver::<Pet>(object, "greet")?;
        Ok(Value::new(format!("I am {}", pet.name)))
    }

    fn birthday(object: &mut dyn Reflect, _args: Vec<Value>) -> GlueResult<Value> {
        let pet = receiver::<Pet>(object, "birthday")?;
        pet.age += 1;
        Ok(Value::new(pet.age))
    }
}

impl Reflect for Pet {
    fn class(&self) -> &'static ClassDescriptor {
        Self::describe()
    }

    fn get_field(&self, name: &str) -> GlueResult<Value> {
        match name {
            "name" => Ok(Value::new(self.name.clone())),
            "age" => Ok(Value::new(self.age)),
            _ => Err(unknown("zoo.Pet", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()> {
        match name {
            "name" => self.name = value.take("name")?,
            "age" => self.age = value.take("age")?,
            _ => return Err(unknown("zoo.Pet", name)),
        }
        Ok(())
    }

    any_impls!();
}

impl Reflectable for Pet {
    fn describe() -> &'static ClassDescriptor {
        static DESCRIPTOR: OnceCell<ClassDescriptor> = OnceCell::new();
        DESCRIPTOR.get_or_init(|| {
            ClassDescriptor::builder("zoo.Pet")
                .param(TypeTag::String)
                .field("name", TypeTag::String)
                .field("age", TypeTag::Int)
                .method("greet", Pet::greet)
                .method("birthday", Pet::birthday)
                .constructor(|args| {
                    let mut args = Args::new("zoo.Pet", args);
                    Ok(Box::new(Pet {
                        name: args.take()?,
                        age: 0,
                    }))
                })
                .finish()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cat {
    pub name: String,
    pub age: i64,
    pub indoor: bool,
}

impl Cat {
    fn greet(object: &mut dyn Reflect, _args: Vec<Value>) -> GlueResult<Value> {
        let cat = receiver::<Cat>(object, "greet")?;
        Ok(Value::new(format!("Meow, I am {}", cat.name)))
    }
}

impl Reflect for Cat {
    fn class(&self) -> &'static ClassDescriptor {
        Self::describe()
    }

    fn get_field(&self, name: &str) -> GlueResult<Value> {
        match name {
            "name" => Ok(Value::new(self.name.clone())),
            "age" => Ok(Value::new(self.age)),
            "indoor" => Ok(Value::new(self.indoor)),
            _ => Err(unknown("zoo.Cat", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()> {
        match name {
            "name" => self.name = value.take("name")?,
            "age" => self.age = value.take("age")?,
            "indoor" => self.indoor = value.take("indoor")?,
            _ => return Err(unknown("zoo.Cat", name)),
        }
        Ok(())
    }

    any_impls!();
}

impl Reflectable for Cat {
    fn describe() -> &'static ClassDescriptor {
        static DESCRIPTOR: OnceCell<ClassDescriptor> = OnceCell::new();
        DESCRIPTOR.get_or_init(|| {
            ClassDescriptor::builder("zoo.Cat")
                .extends("zoo.Pet")
                .param(TypeTag::String)
                .param(TypeTag::Bool)
                .field("name", TypeTag::String)
                .field("age", TypeTag::Int)
                .field("indoor", TypeTag::Bool)
                .method("greet", Cat::greet)
                .constructor(|args| {
                    let mut args = Args::new("zoo.Cat", args);
                    Ok(Box::new(Cat {
                        name: args.take()?,
                        age: 0,
                        indoor: args.take()?,
                    }))
                })
                .finish()
        })
    }
}

/// No constructor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rock {
    pub weight: f64,
}

impl Reflect for Rock {
    fn class(&self) -> &'static ClassDescriptor {
        Self::describe()
    }

    fn get_field(&self, name: &str) -> GlueResult<Value> {
        match name {
            "weight" => Ok(Value::new(self.weight)),
            _ => Err(unknown("zoo.Rock", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()> {
        match name {
            "weight" => self.weight = value.take("weight")?,
            _ => return Err(unknown("zoo.Rock", name)),
        }
        Ok(())
    }

    any_impls!();
}

impl Reflectable for Rock {
    fn describe() -> &'static ClassDescriptor {
        static DESCRIPTOR: OnceCell<ClassDescriptor> = OnceCell::new();
        DESCRIPTOR.get_or_init(|| {
            ClassDescriptor::builder("zoo.Rock")
                .field("weight", TypeTag::Float)
                .finish()
        })
    }
}

/// One field of every JSON-convertible tag, plus a map that is not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub labels: Vec<String>,
    pub nickname: Option<String>,
    pub score: f64,
    pub verified: Option<bool>,
    pub meta: serde_json::Value,
    pub friends: HashMap<String, i64>,
}

impl Reflect for Profile {
    fn class(&self) -> &'static ClassDescriptor {
        Self::describe()
    }

    fn get_field(&self, name: &str) -> GlueResult<Value> {
        match name {
            "labels" => Ok(Value::new(self.labels.clone())),
            "nickname" => Ok(Value::new(self.nickname.clone())),
            "score" => Ok(Value::new(self.score)),
            "verified" => Ok(Value::new(self.verified)),
            "meta" => Ok(Value::new(self.meta.clone())),
            "friends" => Ok(Value::new(self.friends.clone())),
            _ => Err(unknown("zoo.Profile", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()> {
        match name {
            "labels" => self.labels = value.take("labels")?,
            "nickname" => self.nickname = value.take("nickname")?,
            "score" => self.score = value.take("score")?,
            "verified" => self.verified = value.take("verified")?,
            "meta" => self.meta = value.take("meta")?,
            "friends" => self.friends = value.take("friends")?,
            _ => return Err(unknown("zoo.Profile", name)),
        }
        Ok(())
    }

    any_impls!();
}

impl Reflectable for Profile {
    fn describe() -> &'static ClassDescriptor {
        static DESCRIPTOR: OnceCell<ClassDescriptor> = OnceCell::new();
        DESCRIPTOR.get_or_init(|| {
            ClassDescriptor::builder("zoo.Profile")
                .field("labels", TypeTag::list(TypeTag::String))
                .field("nickname", TypeTag::optional(TypeTag::String))
                .field("score", TypeTag::Float)
                .field("verified", TypeTag::optional(TypeTag::Bool))
                .field("meta", TypeTag::Any)
                .field("friends", TypeTag::map(TypeTag::Int))
                .constructor(|_| Ok(Box::new(Profile::default())))
                .finish()
        })
    }
}

/// Stored inside [`Kennel`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collar {
    pub tag: String,
}

impl Reflect for Collar {
    fn class(&self) -> &'static ClassDescriptor {
        Self::describe()
    }

    fn get_field(&self, name: &str) -> GlueResult<Value> {
        match name {
            "tag" => Ok(Value::new(self.tag.clone())),
            _ => Err(unknown("zoo.Collar", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()> {
        match name {
            "tag" => self.tag = value.take("tag")?,
            _ => return Err(unknown("zoo.Collar", name)),
        }
        Ok(())
    }

    any_impls!();
}

impl Reflectable for Collar {
    fn describe() -> &'static ClassDescriptor {
        static DESCRIPTOR: OnceCell<ClassDescriptor> = OnceCell::new();
        DESCRIPTOR.get_or_init(|| {
            ClassDescriptor::builder("zoo.Collar")
                .field("tag", TypeTag::String)
                .constructor(|_| Ok(Box::new(Collar::default())))
                .embedding(Embedding::of::<Collar>())
                .finish()
        })
    }
}

/// Holds nested objects, one required and one optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kennel {
    pub collar: Collar,
    pub spare: Option<Collar>,
}

impl Reflect for Kennel {
    fn class(&self) -> &'static ClassDescriptor {
        Self::describe()
    }

    fn get_field(&self, name: &str) -> GlueResult<Value> {
        match name {
            "collar" => Ok(Value::new(self.collar.clone())),
            "spare" => Ok(Value::new(self.spare.clone())),
            _ => Err(unknown("zoo.Kennel", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()> {
        match name {
            "collar" => self.collar = value.take("collar")?,
            "spare" => self.spare = value.take("spare")?,
            _ => return Err(unknown("zoo.Kennel", name)),
        }
        Ok(())
    }

    any_impls!();
}

impl Reflectable for Kennel {
    fn describe() -> &'static ClassDescriptor {
        static DESCRIPTOR: OnceCell<ClassDescriptor> = OnceCell::new();
        DESCRIPTOR.get_or_init(|| {
            ClassDescriptor::builder("zoo.Kennel")
                .field("collar", TypeTag::class("zoo.Collar"))
                .field("spare", TypeTag::optional(TypeTag::class("zoo.Collar")))
                .constructor(|_| Ok(Box::new(Kennel::default())))
                .finish()
        })
    }
}

/// A registry holding every fixture class
pub fn zoo() -> crate::Registry {
    let registry = crate::Registry::new();
    for class in [
        Pet::describe(),
        Cat::describe(),
        Rock::describe(),
        Profile::describe(),
    ] {
        let _ = registry.register(class);
    }
    registry
}

/// [`zoo`] plus the nested-object fixtures
pub fn kennel() -> crate::Registry {
    let registry = zoo();
    let _ = registry.register(Collar::describe());
    let _ = registry.register(Kennel::describe());
    registry
}
