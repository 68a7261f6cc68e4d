use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::extensions::Extensions;
use super::operation::PathItem;
use super::security::SecurityRequirement;
use super::server::Server;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub version: String,

    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    /// Generator settings embedded in the document.
    #[serde(
        rename = "x-ms-code-generation-settings",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub code_generation_settings: IndexMap<String, Value>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// External documentation link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A parsed OpenAPI 3.x service description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub openapi: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    /// Paths that cannot be expressed as plain templates (query-discriminated
    /// routes). Built after `paths`.
    #[serde(
        rename = "x-ms-paths",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub custom_paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Components,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(flatten)]
    pub extensions: Extensions,
}
