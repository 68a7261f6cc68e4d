use indexmap::IndexMap;
use serde_json::Value;

use super::operations::{Method, Parameter};
use super::schemas::{CompositeType, CompositeTypeId, EnumType, ModelType, Property, TypeArena};
use crate::parse::extensions::Extensions;

/// Target of an `x-ms-forward-to` alias. Pending while building, resolved to
/// an index (into `CodeModel::methods`, or into the owning type's properties)
/// once every candidate exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardTarget {
    Pending(String),
    Resolved(usize),
}

/// The root of the built code model.
#[derive(Debug, Clone)]
pub struct CodeModel {
    pub name: String,
    pub namespace: String,
    pub models_name: Option<String>,
    pub api_version: Option<String>,
    pub documentation: Option<String>,
    pub base_url: String,
    pub extensions: Extensions,
    pub code_gen_extensions: IndexMap<String, Value>,
    /// Client-level properties built from global parameters.
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    /// Every composite type created during the build, including header types.
    pub types: TypeArena,
    /// Named model types, in registration order.
    pub model_types: Vec<CompositeTypeId>,
    pub enum_types: Vec<EnumType>,
    pub header_types: Vec<CompositeTypeId>,
    pub error_types: Vec<CompositeTypeId>,
    pub host_parameters_front: Vec<Parameter>,
    pub host_parameters_back: Vec<Parameter>,
}

impl CodeModel {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            models_name: None,
            api_version: None,
            documentation: None,
            base_url: String::new(),
            extensions: Extensions::new(),
            code_gen_extensions: IndexMap::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            types: TypeArena::default(),
            model_types: Vec::new(),
            enum_types: Vec::new(),
            header_types: Vec::new(),
            error_types: Vec::new(),
            host_parameters_front: Vec::new(),
            host_parameters_back: Vec::new(),
        }
    }

    pub fn composite(&self, id: CompositeTypeId) -> &CompositeType {
        &self.types[id]
    }

    /// Named model type by name.
    pub fn model_type(&self, name: &str) -> Option<&CompositeType> {
        self.model_type_id(name).map(|id| &self.types[id])
    }

    pub fn model_type_id(&self, name: &str) -> Option<CompositeTypeId> {
        self.model_types
            .iter()
            .copied()
            .find(|id| self.types[*id].name == name)
    }

    pub fn header_type(&self, name: &str) -> Option<&CompositeType> {
        self.header_types
            .iter()
            .map(|id| &self.types[*id])
            .find(|t| t.name == name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enum_types
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_error_type(&self, id: CompositeTypeId) -> bool {
        self.error_types.contains(&id)
    }

    /// `id` followed by its ancestors, nearest first.
    pub fn base_chain(&self, id: CompositeTypeId) -> Vec<CompositeTypeId> {
        let mut chain = vec![id];
        let mut current = self.types[id].base_type;
        while let Some(base) = current {
            if chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = self.types[base].base_type;
        }
        chain
    }

    pub fn type_name(&self, model_type: &ModelType) -> String {
        model_type.display_name(&self.types)
    }
}
