use indexmap::IndexMap;

use super::schemas::{CompositeTypeId, Constraint, ModelType};
use super::types::ForwardTarget;
use crate::parse::extensions::Extensions;
use crate::parse::security::SecurityRequirement;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    FormData,
    Body,
}

/// Serialization convention for array-valued parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFormat {
    None,
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

/// A method parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub serialized_name: String,
    pub location: ParameterLocation,
    pub model_type: ModelType,
    pub documentation: Option<String>,
    pub default_value: Option<String>,
    pub is_required: bool,
    pub is_constant: bool,
    pub deprecated: bool,
    pub collection_format: CollectionFormat,
    pub constraints: IndexMap<Constraint, String>,
    pub extensions: Extensions,
    /// Index into `CodeModel::properties` when the parameter is backed by a
    /// client-level property.
    pub client_property: Option<usize>,
    /// Part of a parameterized host rather than of the operation itself.
    pub is_host_parameter: bool,
}

/// Body and headers of one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub body: Option<ModelType>,
    pub headers: Option<CompositeTypeId>,
    pub extensions: Extensions,
}

impl Response {
    pub fn new(body: Option<ModelType>, headers: Option<CompositeTypeId>) -> Self {
        Self {
            body,
            headers,
            extensions: Extensions::new(),
        }
    }
}

/// A fully built operation.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub group: Option<String>,
    /// The operation id as written in the document.
    pub serialized_name: String,
    pub http_method: HttpMethod,
    /// Path template; absent for operations that never go over the wire.
    pub url: Option<String>,
    pub forward_to: Option<ForwardTarget>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub external_docs_url: Option<String>,
    pub deprecation_message: Option<String>,
    pub tags: Vec<String>,
    pub security: Vec<SecurityRequirement>,
    pub request_content_type: String,
    pub response_content_types: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub responses: IndexMap<String, Response>,
    pub default_response: Response,
    pub return_type: Response,
    pub extensions: Extensions,
}

impl Method {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_message.is_some()
    }
}
