use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::attribute::{Attribute, AttributeType};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema id is empty")]
    MissingId,
    #[error("duplicate attribute: {0}")]
    DuplicateAttribute(String),
    #[error("invalid attribute name: {0}")]
    InvalidAttributeName(String),
    #[error("complex attribute without sub-attributes: {0}")]
    MissingSubAttributes(String),
    #[error("sub-attribute cannot be complex: {0}")]
    NestedComplex(String),
}

/// A SCIM schema: a URI id plus its attribute definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up a top-level attribute. Attribute names are case-insensitive
    /// (RFC 7643 §2.1).
    pub fn contains_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Parses and validates an RFC 7643 §7 schema representation.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(text)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_value(value)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_value(&self) -> Value {
        // Only strings, bools and vectors of them: serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::MissingId);
        }
        validate_attributes(&self.attributes, false)
    }
}

fn validate_attributes(attributes: &[Attribute], nested: bool) -> Result<(), SchemaError> {
    for (i, attr) in attributes.iter().enumerate() {
        if !is_attribute_name(attr.name()) {
            return Err(SchemaError::InvalidAttributeName(attr.name().to_string()));
        }
        if attributes[..i]
            .iter()
            .any(|a| a.name().eq_ignore_ascii_case(attr.name()))
        {
            return Err(SchemaError::DuplicateAttribute(attr.name().to_string()));
        }
        if attr.attribute_type() == AttributeType::Complex {
            if nested {
                return Err(SchemaError::NestedComplex(attr.name().to_string()));
            }
            if !attr.has_sub_attributes() {
                return Err(SchemaError::MissingSubAttributes(attr.name().to_string()));
            }
        }
        validate_attributes(attr.sub_attributes(), true)?;
    }
    Ok(())
}

/// `ATTRNAME = ALPHA *(nameChar)`; `$ref` is the one reserved exception.
fn is_attribute_name(name: &str) -> bool {
    if name == "$ref" {
        return true;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}
