use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extensions::{Extensions, X_NULLABLE};
use super::spec::ExternalDocs;

/// A JSON Schema `type` keyword. Keywords outside the OpenAPI vocabulary are
/// kept verbatim so the type builder can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    File,
    Null,
    Unknown(String),
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "string" => DataType::String,
            "number" => DataType::Number,
            "integer" => DataType::Integer,
            "boolean" => DataType::Boolean,
            "array" => DataType::Array,
            "object" => DataType::Object,
            "file" => DataType::File,
            "null" => DataType::Null,
            _ => DataType::Unknown(value),
        }
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        match value {
            DataType::String => "string".into(),
            DataType::Number => "number".into(),
            DataType::Integer => "integer".into(),
            DataType::Boolean => "boolean".into(),
            DataType::Array => "array".into(),
            DataType::Object => "object".into(),
            DataType::File => "file".into(),
            DataType::Null => "null".into(),
            DataType::Unknown(other) => other,
        }
    }
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(DataType),
    Multiple(Vec<DataType>),
}

/// Discriminator for polymorphic schemas. Accepts the 3.x object form and the
/// older bare property-name form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DiscriminatorRepr")]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DiscriminatorRepr {
    Name(String),
    Object {
        #[serde(rename = "propertyName")]
        property_name: String,
        #[serde(default)]
        mapping: IndexMap<String, String>,
    },
}

impl From<DiscriminatorRepr> for Discriminator {
    fn from(repr: DiscriminatorRepr) -> Self {
        match repr {
            DiscriminatorRepr::Name(property_name) => Discriminator {
                property_name,
                mapping: IndexMap::new(),
            },
            DiscriminatorRepr::Object {
                property_name,
                mapping,
            } => Discriminator {
                property_name,
                mapping,
            },
        }
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// `exclusiveMinimum`/`exclusiveMaximum`: a flag on the sibling bound (3.0) or
/// the bound itself (3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    Flag(bool),
    Value(serde_json::Number),
}

static ANY_SCHEMA: LazyLock<Schema> = LazyLock::new(Schema::default);

/// A schema node. `$ref` is kept next to its siblings so a reference can carry
/// a description override or extra constraints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    // Object shape
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    // Numeric constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<serde_json::Number>,
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ExclusiveBound>,
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ExclusiveBound>,
    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<serde_json::Number>,

    // String constraints
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    // Array constraints
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// Schema of a single primitive kind, used for synthesized parameters.
    pub fn of_type(data_type: DataType) -> Self {
        Schema {
            schema_type: Some(TypeSet::Single(data_type)),
            ..Schema::default()
        }
    }

    /// The effective kind; `null` only wins when nothing else is listed.
    pub fn data_type(&self) -> Option<&DataType> {
        match self.schema_type.as_ref()? {
            TypeSet::Single(t) => Some(t),
            TypeSet::Multiple(types) => types
                .iter()
                .find(|t| **t != DataType::Null)
                .or_else(|| types.first()),
        }
    }

    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }
        matches!(&self.schema_type, Some(TypeSet::Multiple(types)) if types.contains(&DataType::Null))
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    /// The value schema of a dictionary. `additionalProperties: true` reads as
    /// an unconstrained schema, `false` as absent.
    pub fn additional_properties_schema(&self) -> Option<&Schema> {
        match self.additional_properties.as_ref()? {
            AdditionalProperties::Bool(true) => Some(&ANY_SCHEMA),
            AdditionalProperties::Bool(false) => None,
            AdditionalProperties::Schema(schema) => Some(schema),
        }
    }

    fn has_shape_keywords(&self) -> bool {
        self.schema_type.is_some()
            || !self.properties.is_empty()
            || self.items.is_some()
            || self.additional_properties_schema().is_some()
            || self.enum_values.is_some()
            || self.discriminator.is_some()
    }

    /// Keywords that change the shape of a node. A `$ref` next to any of them
    /// is not a plain alias.
    pub fn has_structural_keywords(&self) -> bool {
        self.has_shape_keywords() || !self.all_of.is_empty()
    }

    pub fn is_bare_reference(&self) -> bool {
        self.reference.is_some() && !self.has_structural_keywords()
    }

    /// `allOf: [X]` with nothing else of substance.
    pub fn single_all_of_wrapper(&self) -> Option<&Schema> {
        if self.reference.is_some() || self.all_of.len() != 1 || self.has_shape_keywords() {
            return None;
        }
        self.all_of.first()
    }

    pub fn discriminator_name(&self) -> Option<&str> {
        self.discriminator
            .as_ref()
            .map(|d| d.property_name.as_str())
    }

    /// Required and restricted to exactly one value.
    pub fn is_constant(&self, required: bool) -> bool {
        required && self.enum_values.as_ref().is_some_and(|values| values.len() == 1)
    }

    /// Vendor extensions with `nullable` surfaced as `x-nullable`.
    pub fn effective_extensions(&self) -> Extensions {
        let mut extensions = self.extensions.clone();
        if self.is_nullable() {
            extensions.insert(X_NULLABLE, Value::Bool(true));
        }
        extensions
    }
}

/// Render an enum literal or default value the way it is written in a
/// document: strings unquoted, everything else as JSON.
pub fn literal_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
