//! Schema types and builders
//!
//! Resources and data sources describe their attributes with a [`Schema`].
//! The host derives plan behavior from the declared flags and the attached
//! plan modifiers; the provider never computes a plan itself.

use crate::plan_modifier::PlanModifier;
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

/// Attribute type system. Must match the host's type system exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    /// Always f64
    Number,
    Bool,
    /// Ordered, allows duplicates
    List(Box<AttributeType>),
    /// Unordered, no duplicates
    Set(Box<AttributeType>),
    /// String keys only
    Map(Box<AttributeType>),
    /// Fixed structure
    Object(HashMap<String, AttributeType>),
}

/// Schema returned by providers, resources, and data sources.
/// Version is used for state migration.
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }
}

/// Root configuration block of a schema.
#[derive(Debug, Clone)]
pub struct Block {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

/// A single declared attribute.
///
/// Validators and plan modifiers are shared trait objects so schemas stay
/// cheap to clone for the plan engine.
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &format!("{} validators", self.validators.len()))
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .finish()
    }
}

/// Fluent builder for [`Attribute`]. Always use this instead of
/// constructing the struct directly.
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn string_list(name: &str) -> Self {
        Self::new(name, AttributeType::List(Box::new(AttributeType::String)))
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn plan_modifier(mut self, modifier: Arc<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Fluent builder for [`Schema`].
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    description: String::new(),
                    attributes: Vec::new(),
                },
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
