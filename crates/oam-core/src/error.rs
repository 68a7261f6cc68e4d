use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unresolved reference: {0}")]
    UnresolvedRef(String),

    #[error("circular reference detected: {0}")]
    CircularRef(String),
}

/// Fatal conditions raised while building a code model. Every one of them
/// aborts the whole build.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("the document has no info section")]
    InfoSectionMissing,

    #[error("the info section has no title and no client name was configured")]
    TitleMissing,

    #[error("operation {verb} {path} has no operationId")]
    OperationIdMissing { verb: String, path: String },

    #[error("duplicate operationId: {0}")]
    DuplicateOperationId(String),

    #[error("array schema '{0}' has no items")]
    MissingArrayItems(String),

    #[error("enum '{0}' declares no values")]
    EmptyEnum(String),

    #[error("schema '{0}' carries x-ms-enum without an enum array")]
    DanglingEnumExtension(String),

    #[error("x-ms-enum on '{0}' has no name")]
    MissingEnumName(String),

    #[error("x-ms-enum values of '{name}' do not match its enum: {declared} vs {extension}")]
    EnumValueMismatch {
        name: String,
        declared: String,
        extension: String,
    },

    #[error("enum '{name}' is declared twice with different values: {existing} vs {conflicting}")]
    DuplicateEnumName {
        name: String,
        existing: String,
        conflicting: String,
    },

    #[error("schema '{0}' extends a chain of ancestors without any properties")]
    InvalidAncestors(String),

    #[error("unsupported schema type '{kind}' on '{name}'")]
    UnsupportedSchemaType { name: String, kind: String },

    #[error("body parameter '{0}' has no schema")]
    MissingBodySchema(String),

    #[error("invalid response header types for operation '{0}'")]
    InvalidResponseHeaders(String),

    #[error(
        "the produces of '{operation}' requires schema '{schema}' to model binary data, but it has no byte array property"
    )]
    MissingByteArrayProperty { operation: String, schema: String },

    #[error("operation '{operation}' has an unsupported response for status {status}")]
    UnsupportedResponseMimeType { operation: String, status: String },

    #[error("invalid x-ms-parameterized-host positionInOperation '{0}', expected 'first' or 'last'")]
    InvalidHostPosition(String),

    #[error("code generation failed: {0}")]
    CodeGeneration(String),
}
