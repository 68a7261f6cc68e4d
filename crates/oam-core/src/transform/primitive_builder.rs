use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::Value;

use super::context::BuildContext;
use crate::error::TransformError;
use crate::ir::{Constraint, EnumType, EnumValue, KnownPrimaryType, ModelType, PrimaryType};
use crate::parse::extensions::{Extensions, X_MS_ENUM};
use crate::parse::ref_resolve::{SchemaId, reference_name};
use crate::parse::schema::{DataType, ExclusiveBound, Schema, literal_to_string};

/// Map a schema's `(type, format)` pair to a primitive kind.
pub fn primary_type(schema: &Schema, name: &str) -> Result<PrimaryType, TransformError> {
    let format = schema.format.as_deref();
    let kind = match schema.data_type() {
        None if schema.enum_values.is_some() => KnownPrimaryType::String,
        None => KnownPrimaryType::Object,
        Some(DataType::String) => match format {
            Some("date") => KnownPrimaryType::Date,
            Some("date-time") => KnownPrimaryType::DateTime,
            Some("date-time-rfc1123") => KnownPrimaryType::DateTimeRfc1123,
            Some("byte") => KnownPrimaryType::ByteArray,
            Some("binary") | Some("file") => KnownPrimaryType::Stream,
            Some("duration") => KnownPrimaryType::TimeSpan,
            Some("uuid") => KnownPrimaryType::Uuid,
            Some("base64url") => KnownPrimaryType::Base64Url,
            _ => KnownPrimaryType::String,
        },
        Some(DataType::Number) => match format {
            Some("decimal") => KnownPrimaryType::Decimal,
            _ => KnownPrimaryType::Double,
        },
        Some(DataType::Integer) => match format {
            Some("int64") => KnownPrimaryType::Long,
            Some("unixtime") => KnownPrimaryType::UnixTime,
            _ => KnownPrimaryType::Int,
        },
        Some(DataType::Boolean) => KnownPrimaryType::Boolean,
        Some(DataType::File) => KnownPrimaryType::Stream,
        Some(DataType::Object) if format == Some("file") => KnownPrimaryType::Stream,
        Some(DataType::Object) | Some(DataType::Array) | Some(DataType::Null) => {
            KnownPrimaryType::Object
        }
        Some(DataType::Unknown(kind)) => {
            return Err(TransformError::UnsupportedSchemaType {
                name: name.to_string(),
                kind: kind.clone(),
            });
        }
    };
    Ok(PrimaryType {
        kind,
        format: schema.format.clone(),
    })
}

/// Per-member details shared by properties and parameters.
#[derive(Debug, Default)]
pub(crate) struct Facets {
    pub default_value: Option<String>,
    pub is_constant: bool,
    pub documentation: Option<String>,
    pub constraints: IndexMap<Constraint, String>,
    pub extensions: Extensions,
}

pub(crate) fn schema_facets(schema: &Schema, required: bool) -> Facets {
    let mut facets = Facets {
        default_value: schema.default_value.as_ref().map(literal_to_string),
        is_constant: false,
        documentation: schema.description.clone(),
        constraints: constraints(schema),
        extensions: schema.effective_extensions(),
    };
    if schema.is_constant(required) {
        facets.is_constant = true;
        facets.default_value = schema
            .enum_values
            .as_ref()
            .and_then(|values| values.first())
            .map(literal_to_string);
    }
    facets
}

fn constraints(schema: &Schema) -> IndexMap<Constraint, String> {
    let mut out = IndexMap::new();
    let data_type = schema.data_type();
    let numeric = matches!(data_type, None | Some(DataType::Number) | Some(DataType::Integer));
    let textual = matches!(data_type, None | Some(DataType::String));
    let listed = matches!(data_type, None | Some(DataType::Array));

    if numeric {
        bound(
            &mut out,
            schema.maximum.as_ref(),
            schema.exclusive_maximum.as_ref(),
            Constraint::InclusiveMaximum,
            Constraint::ExclusiveMaximum,
        );
        bound(
            &mut out,
            schema.minimum.as_ref(),
            schema.exclusive_minimum.as_ref(),
            Constraint::InclusiveMinimum,
            Constraint::ExclusiveMinimum,
        );
        if let Some(multiple_of) = &schema.multiple_of {
            out.insert(Constraint::MultipleOf, multiple_of.to_string());
        }
    }
    if textual {
        if let Some(max) = schema.max_length {
            out.insert(Constraint::MaxLength, max.to_string());
        }
        if let Some(min) = schema.min_length {
            out.insert(Constraint::MinLength, min.to_string());
        }
        if let Some(pattern) = &schema.pattern {
            out.insert(Constraint::Pattern, pattern.clone());
        }
    }
    if listed {
        if let Some(max) = schema.max_items {
            out.insert(Constraint::MaxItems, max.to_string());
        }
        if let Some(min) = schema.min_items {
            out.insert(Constraint::MinItems, min.to_string());
        }
        if schema.unique_items == Some(true) {
            out.insert(Constraint::UniqueItems, "true".to_string());
        }
    }
    out
}

// 3.0 flags the inclusive bound as exclusive; 3.1 carries the bound itself.
fn bound(
    out: &mut IndexMap<Constraint, String>,
    value: Option<&serde_json::Number>,
    exclusive: Option<&ExclusiveBound>,
    inclusive_kind: Constraint,
    exclusive_kind: Constraint,
) {
    match (value, exclusive) {
        (_, Some(ExclusiveBound::Value(limit))) => {
            out.insert(exclusive_kind, limit.to_string());
        }
        (Some(value), Some(ExclusiveBound::Flag(true))) => {
            out.insert(exclusive_kind, value.to_string());
        }
        (Some(value), _) => {
            out.insert(inclusive_kind, value.to_string());
        }
        (None, _) => {}
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn quote_join<'v>(values: impl IntoIterator<Item = &'v str>) -> String {
    values
        .into_iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> BuildContext<'a> {
    /// Build the non-composite shapes: enums, sequences, dictionaries and
    /// primitives.
    pub(crate) fn build_primitive<'s>(
        &mut self,
        schema: &'s Schema,
        id: &SchemaId,
        name: &str,
        required: bool,
    ) -> Result<ModelType, TransformError>
    where
        'a: 's,
    {
        let data_type = schema.data_type();
        if let Some(values) = &schema.enum_values {
            if values.is_empty() {
                return Err(TransformError::EmptyEnum(name.to_string()));
            }
            let enumerable = matches!(
                data_type,
                None | Some(DataType::String)
                    | Some(DataType::Integer)
                    | Some(DataType::Number)
                    | Some(DataType::Boolean)
            );
            if enumerable && !schema.is_constant(required) {
                return self.build_enum(schema, name).map(ModelType::Enum);
            }
        }

        if data_type == Some(&DataType::Array) {
            let items = schema
                .items
                .as_deref()
                .ok_or_else(|| TransformError::MissingArrayItems(name.to_string()))?;
            let item_name = match items.reference.as_deref() {
                Some(reference) => reference_name(reference).to_string(),
                None => format!("{name}Item"),
            };
            let element = self.build_type(items, id.child("items"), &item_name, false)?;
            return Ok(ModelType::Sequence(Box::new(element)));
        }

        if matches!(data_type, None | Some(DataType::Object)) {
            if let Some(values) = schema.additional_properties_schema() {
                let value = self.build_dictionary_value(values, id, name)?;
                return Ok(ModelType::Dictionary {
                    value: Box::new(value),
                    supports_additional_properties: true,
                });
            }
        }

        primary_type(schema, name).map(ModelType::Primary)
    }

    pub(crate) fn build_dictionary_value<'s>(
        &mut self,
        values: &'s Schema,
        id: &SchemaId,
        name: &str,
    ) -> Result<ModelType, TransformError>
    where
        'a: 's,
    {
        let value_name = match values.reference.as_deref() {
            Some(reference) => reference_name(reference).to_string(),
            None => format!("{name}Value"),
        };
        self.build_type(values, id.child("additionalProperties"), &value_name, false)
    }

    /// Build an enum, applying `x-ms-enum` and unifying named enums across
    /// the document.
    pub(crate) fn build_enum(
        &mut self,
        schema: &Schema,
        name: &str,
    ) -> Result<EnumType, TransformError> {
        let literals: Vec<String> = schema
            .enum_values
            .iter()
            .flatten()
            .map(literal_to_string)
            .collect();
        let mut enum_type = EnumType {
            name: String::new(),
            underlying_type: primary_type(schema, name)?.kind,
            values: literals
                .iter()
                .map(|literal| EnumValue {
                    name: literal.clone(),
                    serialized_name: literal.clone(),
                    description: None,
                    allowed_values: Vec::new(),
                })
                .collect(),
            model_as_string: true,
            old_model_as_string: false,
            documentation: schema.description.clone(),
        };

        let Some(extension) = schema.extensions.get(X_MS_ENUM) else {
            return Ok(enum_type);
        };

        let enum_name = extension
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| TransformError::MissingEnumName(name.to_string()))?;
        enum_type.name = enum_name.to_string();
        enum_type.model_as_string = truthy(extension.get("modelAsString"));
        enum_type.old_model_as_string = truthy(extension.get("oldModelAsString"));

        if let Some(overrides) = extension.get("values").and_then(Value::as_array) {
            let values: Vec<EnumValue> = overrides.iter().map(enum_value_override).collect();
            let declared: BTreeSet<&str> = literals.iter().map(String::as_str).collect();
            let extended: BTreeSet<&str> =
                values.iter().map(|v| v.serialized_name.as_str()).collect();
            if declared != extended {
                return Err(TransformError::EnumValueMismatch {
                    name: enum_type.name,
                    declared: quote_join(literals.iter().map(String::as_str)),
                    extension: quote_join(values.iter().map(|v| v.serialized_name.as_str())),
                });
            }
            enum_type.values = values;
        }

        if let Some(existing) = self.model.enum_type(&enum_type.name) {
            if !existing.structurally_equals(&enum_type) {
                return Err(TransformError::DuplicateEnumName {
                    name: enum_type.name.clone(),
                    existing: quote_join(existing.serialized_values()),
                    conflicting: quote_join(enum_type.serialized_values()),
                });
            }
            let mut shared = existing.clone();
            shared.documentation = enum_type.documentation;
            return Ok(shared);
        }

        log::debug!("registering enum {}", enum_type.name);
        self.model.enum_types.push(enum_type.clone());
        Ok(enum_type)
    }
}

fn enum_value_override(entry: &Value) -> EnumValue {
    let value = entry.get("value").map(literal_to_string).unwrap_or_default();
    EnumValue {
        name: entry
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.clone()),
        serialized_name: value,
        description: entry
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        allowed_values: entry
            .get("allowedValues")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(literal_to_string).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn kind(yaml: &str) -> KnownPrimaryType {
        primary_type(&schema(yaml), "test").unwrap().kind
    }

    #[test]
    fn maps_string_formats() {
        assert_eq!(kind("type: string"), KnownPrimaryType::String);
        assert_eq!(kind("{type: string, format: date}"), KnownPrimaryType::Date);
        assert_eq!(kind("{type: string, format: date-time}"), KnownPrimaryType::DateTime);
        assert_eq!(
            kind("{type: string, format: date-time-rfc1123}"),
            KnownPrimaryType::DateTimeRfc1123
        );
        assert_eq!(kind("{type: string, format: byte}"), KnownPrimaryType::ByteArray);
        assert_eq!(kind("{type: string, format: binary}"), KnownPrimaryType::Stream);
        assert_eq!(kind("{type: string, format: duration}"), KnownPrimaryType::TimeSpan);
        assert_eq!(kind("{type: string, format: uuid}"), KnownPrimaryType::Uuid);
        assert_eq!(kind("{type: string, format: base64url}"), KnownPrimaryType::Base64Url);
        assert_eq!(kind("{type: string, format: password}"), KnownPrimaryType::String);
    }

    #[test]
    fn maps_numeric_and_other_kinds() {
        assert_eq!(kind("type: number"), KnownPrimaryType::Double);
        assert_eq!(kind("{type: number, format: decimal}"), KnownPrimaryType::Decimal);
        assert_eq!(kind("type: integer"), KnownPrimaryType::Int);
        assert_eq!(kind("{type: integer, format: int64}"), KnownPrimaryType::Long);
        assert_eq!(kind("{type: integer, format: unixtime}"), KnownPrimaryType::UnixTime);
        assert_eq!(kind("type: boolean"), KnownPrimaryType::Boolean);
        assert_eq!(kind("type: file"), KnownPrimaryType::Stream);
        assert_eq!(kind("{type: object, format: file}"), KnownPrimaryType::Stream);
        assert_eq!(kind("type: object"), KnownPrimaryType::Object);
        assert_eq!(kind("description: anything"), KnownPrimaryType::Object);
        assert_eq!(kind("enum: [a, b]"), KnownPrimaryType::String);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = primary_type(&schema("type: decimal128"), "Money").unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnsupportedSchemaType { ref name, ref kind }
                if name == "Money" && kind == "decimal128"
        ));
    }

    #[test]
    fn constraints_follow_the_kind() {
        let number = schema_facets(
            &schema("{type: integer, minimum: 1, maximum: 10, exclusiveMaximum: true, maxLength: 3}"),
            false,
        );
        assert_eq!(number.constraints.get(&Constraint::InclusiveMinimum).map(String::as_str), Some("1"));
        assert_eq!(number.constraints.get(&Constraint::ExclusiveMaximum).map(String::as_str), Some("10"));
        assert!(!number.constraints.contains_key(&Constraint::MaxLength));

        let text = schema_facets(&schema("{type: string, pattern: '^a+$', minLength: 2}"), false);
        assert_eq!(text.constraints.get(&Constraint::Pattern).map(String::as_str), Some("^a+$"));
        assert_eq!(text.constraints.get(&Constraint::MinLength).map(String::as_str), Some("2"));

        let list = schema_facets(&schema("{type: array, items: {type: string}, uniqueItems: true}"), false);
        assert_eq!(list.constraints.get(&Constraint::UniqueItems).map(String::as_str), Some("true"));
    }

    #[test]
    fn single_value_required_enum_is_constant() {
        let facets = schema_facets(&schema("{type: string, enum: [fixed]}"), true);
        assert!(facets.is_constant);
        assert_eq!(facets.default_value.as_deref(), Some("fixed"));

        let optional = schema_facets(&schema("{type: string, enum: [fixed]}"), false);
        assert!(!optional.is_constant);
        assert!(optional.default_value.is_none());
    }
}
