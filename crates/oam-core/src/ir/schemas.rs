use std::ops::{Index, IndexMut};

use indexmap::IndexMap;

use super::types::ForwardTarget;
use crate::parse::extensions::Extensions;

/// The closed set of primitive kinds a schema can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownPrimaryType {
    Object,
    Int,
    Long,
    Double,
    Decimal,
    String,
    Stream,
    ByteArray,
    Date,
    DateTime,
    DateTimeRfc1123,
    TimeSpan,
    Boolean,
    Uuid,
    Base64Url,
    UnixTime,
}

impl KnownPrimaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownPrimaryType::Object => "Object",
            KnownPrimaryType::Int => "Int",
            KnownPrimaryType::Long => "Long",
            KnownPrimaryType::Double => "Double",
            KnownPrimaryType::Decimal => "Decimal",
            KnownPrimaryType::String => "String",
            KnownPrimaryType::Stream => "Stream",
            KnownPrimaryType::ByteArray => "ByteArray",
            KnownPrimaryType::Date => "Date",
            KnownPrimaryType::DateTime => "DateTime",
            KnownPrimaryType::DateTimeRfc1123 => "DateTimeRfc1123",
            KnownPrimaryType::TimeSpan => "TimeSpan",
            KnownPrimaryType::Boolean => "Boolean",
            KnownPrimaryType::Uuid => "Uuid",
            KnownPrimaryType::Base64Url => "Base64Url",
            KnownPrimaryType::UnixTime => "UnixTime",
        }
    }
}

/// A primitive type with the format it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryType {
    pub kind: KnownPrimaryType,
    pub format: Option<String>,
}

/// One literal of an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub serialized_name: String,
    pub description: Option<String>,
    pub allowed_values: Vec<String>,
}

/// An enum. An empty name means the enum is anonymous and stays inline.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub underlying_type: KnownPrimaryType,
    pub values: Vec<EnumValue>,
    /// Open enum: unknown values are accepted and the enum is modeled as a
    /// string.
    pub model_as_string: bool,
    pub old_model_as_string: bool,
    pub documentation: Option<String>,
}

impl EnumType {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn serialized_values(&self) -> Vec<&str> {
        self.values
            .iter()
            .map(|v| v.serialized_name.as_str())
            .collect()
    }

    /// Same name, same literals in the same order, same openness.
    /// Documentation does not take part.
    pub fn structurally_equals(&self, other: &EnumType) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.model_as_string == other.model_as_string
            && self.underlying_type == other.underlying_type
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.serialized_name == b.serialized_name && a.name == b.name)
    }
}

/// Handle of a composite type in the [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeTypeId(usize);

impl CompositeTypeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A fully resolved model type.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelType {
    Primary(PrimaryType),
    Enum(EnumType),
    Sequence(Box<ModelType>),
    Dictionary {
        value: Box<ModelType>,
        supports_additional_properties: bool,
    },
    Composite(CompositeTypeId),
}

impl ModelType {
    pub fn primary(kind: KnownPrimaryType) -> Self {
        ModelType::Primary(PrimaryType { kind, format: None })
    }

    /// The generic root every type unifies to when nothing narrower fits.
    pub fn object() -> Self {
        Self::primary(KnownPrimaryType::Object)
    }

    pub fn is_primary(&self, kind: KnownPrimaryType) -> bool {
        matches!(self, ModelType::Primary(p) if p.kind == kind)
    }

    pub fn as_composite(&self) -> Option<CompositeTypeId> {
        match self {
            ModelType::Composite(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            ModelType::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Structural equality. Composites are compared member by member one
    /// level deep; nested composites compare by handle.
    pub fn structurally_equals(&self, other: &ModelType, types: &TypeArena) -> bool {
        match (self, other) {
            (ModelType::Composite(a), ModelType::Composite(b)) => {
                a == b || types[*a].structurally_equals(&types[*b])
            }
            _ => self.same_shape(other),
        }
    }

    fn same_shape(&self, other: &ModelType) -> bool {
        match (self, other) {
            (ModelType::Primary(a), ModelType::Primary(b)) => a.kind == b.kind,
            (ModelType::Enum(a), ModelType::Enum(b)) => a.structurally_equals(b),
            (ModelType::Sequence(a), ModelType::Sequence(b)) => a.same_shape(b),
            (
                ModelType::Dictionary { value: a, .. },
                ModelType::Dictionary { value: b, .. },
            ) => a.same_shape(b),
            (ModelType::Composite(a), ModelType::Composite(b)) => a == b,
            _ => false,
        }
    }

    /// Short human-readable rendering, e.g. `Sequence<Pet>`.
    pub fn display_name(&self, types: &TypeArena) -> String {
        match self {
            ModelType::Primary(p) => p.kind.as_str().to_string(),
            ModelType::Enum(e) if e.is_anonymous() => {
                format!("Enum[{}]", e.serialized_values().join("|"))
            }
            ModelType::Enum(e) => e.name.clone(),
            ModelType::Sequence(element) => format!("Sequence<{}>", element.display_name(types)),
            ModelType::Dictionary { value, .. } => {
                format!("Dictionary<{}>", value.display_name(types))
            }
            ModelType::Composite(id) => types[*id].name.clone(),
        }
    }
}

/// Validation constraints carried by properties and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    InclusiveMaximum,
    ExclusiveMaximum,
    InclusiveMinimum,
    ExclusiveMinimum,
    MaxLength,
    MinLength,
    Pattern,
    MaxItems,
    MinItems,
    MultipleOf,
    UniqueItems,
}

/// A property of a composite type.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    /// Wire name; absent for properties that never go over the wire.
    pub serialized_name: Option<String>,
    pub model_type: ModelType,
    pub documentation: Option<String>,
    pub summary: Option<String>,
    pub default_value: Option<String>,
    pub is_required: bool,
    pub is_constant: bool,
    pub is_read_only: bool,
    pub deprecated: bool,
    pub constraints: IndexMap<Constraint, String>,
    pub extensions: Extensions,
    pub forward_to: Option<ForwardTarget>,
}

impl Property {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        let name = name.into();
        Self {
            serialized_name: Some(name.clone()),
            name,
            model_type,
            documentation: None,
            summary: None,
            default_value: None,
            is_required: false,
            is_constant: false,
            is_read_only: false,
            deprecated: false,
            constraints: IndexMap::new(),
            extensions: Extensions::new(),
            forward_to: None,
        }
    }

    fn structurally_equals(&self, other: &Property) -> bool {
        self.name == other.name
            && self.serialized_name == other.serialized_name
            && self.is_required == other.is_required
            && self.is_constant == other.is_constant
            && self.is_read_only == other.is_read_only
            && self.default_value == other.default_value
            && self.model_type.same_shape(&other.model_type)
    }
}

/// A named record type.
#[derive(Debug, Clone)]
pub struct CompositeType {
    pub name: String,
    pub serialized_name: String,
    pub documentation: Option<String>,
    pub summary: Option<String>,
    pub external_docs_url: Option<String>,
    pub deprecated: bool,
    pub base_type: Option<CompositeTypeId>,
    pub polymorphic_discriminator: Option<String>,
    pub properties: Vec<Property>,
    pub contains_constant_properties: bool,
    pub extensions: Extensions,
}

impl CompositeType {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            serialized_name: name.clone(),
            name,
            documentation: None,
            summary: None,
            external_docs_url: None,
            deprecated: false,
            base_type: None,
            polymorphic_discriminator: None,
            properties: Vec::new(),
            contains_constant_properties: false,
            extensions: Extensions::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn structurally_equals(&self, other: &CompositeType) -> bool {
        self.name == other.name
            && self.serialized_name == other.serialized_name
            && self.polymorphic_discriminator == other.polymorphic_discriminator
            && self.base_type == other.base_type
            && self.properties.len() == other.properties.len()
            && self
                .properties
                .iter()
                .zip(&other.properties)
                .all(|(a, b)| a.structurally_equals(b))
    }
}

/// Owner of every composite type created during a build. Types refer to each
/// other through [`CompositeTypeId`] handles, which keeps recursive and
/// shared types acyclic in memory.
#[derive(Debug, Clone, Default)]
pub struct TypeArena {
    types: Vec<CompositeType>,
}

impl TypeArena {
    pub fn alloc(&mut self, composite: CompositeType) -> CompositeTypeId {
        self.types.push(composite);
        CompositeTypeId(self.types.len() - 1)
    }

    pub fn get(&self, id: CompositeTypeId) -> Option<&CompositeType> {
        self.types.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CompositeTypeId, &CompositeType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (CompositeTypeId(i), t))
    }

    pub fn ids(&self) -> impl Iterator<Item = CompositeTypeId> + use<> {
        (0..self.types.len()).map(CompositeTypeId)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Index<CompositeTypeId> for TypeArena {
    type Output = CompositeType;

    fn index(&self, id: CompositeTypeId) -> &CompositeType {
        &self.types[id.0]
    }
}

impl IndexMut<CompositeTypeId> for TypeArena {
    fn index_mut(&mut self, id: CompositeTypeId) -> &mut CompositeType {
        &mut self.types[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(arena: &mut TypeArena, name_type: KnownPrimaryType) -> CompositeTypeId {
        let mut composite = CompositeType::new("Pet");
        composite
            .properties
            .push(Property::new("name", ModelType::primary(name_type)));
        arena.alloc(composite)
    }

    #[test]
    fn composites_with_same_members_are_equal() {
        let mut arena = TypeArena::default();
        let a = pet(&mut arena, KnownPrimaryType::String);
        let b = pet(&mut arena, KnownPrimaryType::String);
        let c = pet(&mut arena, KnownPrimaryType::Int);
        assert!(ModelType::Composite(a).structurally_equals(&ModelType::Composite(b), &arena));
        assert!(!ModelType::Composite(a).structurally_equals(&ModelType::Composite(c), &arena));
    }

    #[test]
    fn sequences_compare_elements() {
        let arena = TypeArena::default();
        let strings = ModelType::Sequence(Box::new(ModelType::primary(KnownPrimaryType::String)));
        let ints = ModelType::Sequence(Box::new(ModelType::primary(KnownPrimaryType::Int)));
        assert!(strings.structurally_equals(&strings.clone(), &arena));
        assert!(!strings.structurally_equals(&ints, &arena));
        assert_eq!(strings.display_name(&arena), "Sequence<String>");
    }
}
