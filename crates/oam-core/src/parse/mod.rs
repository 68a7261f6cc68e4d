pub mod components;
pub mod extensions;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use crate::error::ParseError;
use spec::ServiceDefinition;

/// Parse a service description from YAML.
pub fn from_yaml(input: &str) -> Result<ServiceDefinition, ParseError> {
    let document: ServiceDefinition = serde_yaml_ng::from_str(input)?;
    validate_version(&document)?;
    Ok(document)
}

/// Parse a service description from JSON.
pub fn from_json(input: &str) -> Result<ServiceDefinition, ParseError> {
    let document: ServiceDefinition = serde_json::from_str(input)?;
    validate_version(&document)?;
    Ok(document)
}

fn validate_version(document: &ServiceDefinition) -> Result<(), ParseError> {
    if !document.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(document.openapi.clone()));
    }
    Ok(())
}
