use indexmap::IndexMap;

use super::context::BuildContext;
use crate::error::{ParseError, TransformError};
use crate::ir::{CompositeType, CompositeTypeId, KnownPrimaryType, Method, ModelType, Property, Response};
use crate::parse::extensions::{
    X_MS_ENUM, X_MS_ERROR_RESPONSE, X_MS_HEADER_COLLECTION_PREFIX, X_MS_HEADERS,
};
use crate::parse::operation::Operation;
use crate::parse::ref_resolve::{SchemaId, reference_name};
use crate::parse::response::Header;
use crate::parse::schema::{DataType, Schema};

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

pub(crate) fn is_json(media_type: &str) -> bool {
    starts_with_ignore_case(media_type, APPLICATION_JSON)
}

pub(crate) fn is_xml(media_type: &str) -> bool {
    starts_with_ignore_case(media_type, APPLICATION_XML)
}

/// Responses of an operation that can be deserialized into a model.
fn produces_deserializable(produces: &[String]) -> bool {
    produces.iter().any(|p| is_json(p) || is_xml(p))
}

/// Name hint for a response body: its reference target, else synthesized.
fn body_name(schema: &Schema, synthesized: impl FnOnce() -> String) -> String {
    match schema.reference.as_deref() {
        Some(reference) => reference_name(reference).to_string(),
        None => synthesized(),
    }
}

impl<'a> BuildContext<'a> {
    /// Synthesize the header type shared by every response of an operation.
    pub(crate) fn build_response_headers(
        &mut self,
        method: &Method,
        operation: &'a Operation,
        pointer: &SchemaId,
    ) -> Result<Option<CompositeTypeId>, TransformError> {
        let type_name = format!(
            "{}-{}-Headers",
            method.group.as_deref().unwrap_or_default(),
            method.name
        )
        .trim_matches('-')
        .to_string();

        let mut references: Vec<ModelType> = Vec::new();
        let mut classical: IndexMap<&'a str, &'a Header> = IndexMap::new();
        for (status, response) in &operation.responses {
            let response = self.resolver.resolve_response(response)?;
            match response.extensions.get(X_MS_HEADERS) {
                Some(raw) => {
                    let schema: Schema =
                        serde_json::from_value(raw.clone()).map_err(ParseError::from)?;
                    let id = pointer.child("responses").child(status).child(X_MS_HEADERS);
                    let built = self.build_type(&schema, id, &type_name, false)?;
                    if !references.contains(&built) {
                        references.push(built);
                    }
                }
                None => {
                    for (name, header) in &response.headers {
                        classical.insert(name.as_str(), self.resolver.resolve_header(header)?);
                    }
                }
            }
        }

        let header_type = match references.as_slice() {
            [] => self.build_classical_headers(method, &type_name, classical, pointer)?,
            [ModelType::Composite(id)] if classical.is_empty() => *id,
            _ => {
                log::error!(
                    "invalid response header types on {}: every x-ms-headers reference must point \
                     to the same object type and no response may declare classical headers next to them",
                    method.serialized_name
                );
                return Err(TransformError::InvalidResponseHeaders(
                    method.serialized_name.clone(),
                ));
            }
        };

        if self.model.types[header_type].properties.is_empty() {
            return Ok(None);
        }
        Ok(Some(header_type))
    }

    fn build_classical_headers(
        &mut self,
        method: &Method,
        type_name: &str,
        headers: IndexMap<&'a str, &'a Header>,
        pointer: &SchemaId,
    ) -> Result<CompositeTypeId, TransformError> {
        let mut composite = CompositeType::new(type_name);
        composite.documentation = Some(format!("Defines headers for {} operation.", method.name));

        for (name, header) in headers {
            let mut schema = header
                .schema
                .clone()
                .unwrap_or_else(|| Schema::of_type(DataType::String));
            if let Some(extension) = header.extensions.get(X_MS_ENUM) {
                if !schema.extensions.contains(X_MS_ENUM) {
                    schema.extensions.insert(X_MS_ENUM, extension.clone());
                }
            }
            let id = pointer.child("headers").child(name);
            let value = self.build_type(&schema, id, name, false)?;

            let property = if header.extensions.contains(X_MS_HEADER_COLLECTION_PREFIX) {
                Property::new(
                    name,
                    ModelType::Dictionary {
                        value: Box::new(value),
                        supports_additional_properties: false,
                    },
                )
            } else {
                let mut property = Property::new(name, value);
                property.documentation = header.description.clone();
                property
            };
            composite.properties.push(Property {
                extensions: header.extensions.clone(),
                ..property
            });
        }
        Ok(self.model.types.alloc(composite))
    }

    /// Build every response of an operation into `method`. Returns the body
    /// types that take part in return-type unification.
    pub(crate) fn build_responses(
        &mut self,
        method: &mut Method,
        operation: &'a Operation,
        produces: &[String],
        headers: Option<CompositeTypeId>,
        pointer: &SchemaId,
    ) -> Result<Vec<ModelType>, TransformError> {
        let mut candidates = Vec::new();
        for (status, response) in &operation.responses {
            let response = self.resolver.resolve_response(response)?;
            let schema = response.schema();
            let schema_id = {
                let base = pointer.child("responses").child(status).child("content");
                match response.content.iter().find(|(_, m)| m.schema.is_some()) {
                    Some((media_type, _)) => base.child(media_type).child("schema"),
                    None => base,
                }
            };

            if status.eq_ignore_ascii_case("default") {
                if let (true, Some(schema)) = (produces_deserializable(produces), schema) {
                    let name = body_name(schema, || format!("{}ErrorModel", method.name));
                    let body = self.build_type(schema, schema_id, &name, false)?;
                    if let Some(id) = body.as_composite() {
                        self.error_seeds.insert(self.model.types[id].name.clone());
                        self.add_error_type(id);
                    }
                    method.default_response = Response {
                        body: Some(body),
                        headers,
                        extensions: response.extensions.clone(),
                    };
                }
                continue;
            }

            let body = self.build_response_body(method, status, schema, schema_id, produces)?;
            let flagged = response.extensions.flag(X_MS_ERROR_RESPONSE);
            match (&body, flagged) {
                (Some(body), false) => candidates.push(body.clone()),
                (Some(ModelType::Composite(id)), true) => {
                    self.error_seeds.insert(self.model.types[*id].name.clone());
                    self.add_error_type(*id);
                }
                _ => {}
            }
            method.responses.insert(
                status.clone(),
                Response {
                    body,
                    headers,
                    extensions: response.extensions.clone(),
                },
            );
        }
        Ok(candidates)
    }

    /// Try the deserializable, stream and empty strategies in order.
    fn build_response_body(
        &mut self,
        method: &Method,
        status: &str,
        schema: Option<&'a Schema>,
        schema_id: SchemaId,
        produces: &[String],
    ) -> Result<Option<ModelType>, TransformError> {
        let Some(schema) = schema else {
            return Ok(None);
        };

        if produces_deserializable(produces) {
            let name = body_name(schema, || format!("{}{status}Response", method.name));
            return self.build_type(schema, schema_id, &name, false).map(Some);
        }

        if !produces.is_empty() {
            let name = body_name(schema, || format!("{}{status}Response", method.name));
            let body = self.build_type(schema, schema_id, &name, false)?;
            if let Some(id) = body.as_composite() {
                let composite = &self.model.types[id];
                let has_bytes = composite
                    .properties
                    .iter()
                    .any(|p| p.model_type.is_primary(KnownPrimaryType::ByteArray));
                if !has_bytes {
                    return Err(TransformError::MissingByteArrayProperty {
                        operation: method.serialized_name.clone(),
                        schema: composite.name.clone(),
                    });
                }
            }
            return Ok(Some(body));
        }

        let (id, unwrapped) = self.resolver.unwrap(schema, schema_id)?;
        if self.resolver.expand_all_of(unwrapped, &id)?.properties.is_empty() {
            return Ok(None);
        }
        log::warn!(
            "operation {} produces nothing but its {status} response schema has properties",
            method.serialized_name
        );
        Err(TransformError::UnsupportedResponseMimeType {
            operation: method.serialized_name.clone(),
            status: status.to_string(),
        })
    }

    /// Narrowest common ancestor of the candidate response bodies.
    pub(crate) fn unify_return_type(
        &self,
        candidates: &[ModelType],
        headers: Option<CompositeTypeId>,
    ) -> Response {
        match candidates {
            [] => Response::new(None, headers),
            [single] => Response::new(Some(single.clone()), headers),
            _ => {
                let chains: Vec<Vec<ModelType>> = candidates
                    .iter()
                    .map(|candidate| self.inheritance_chain(candidate))
                    .collect();
                let mut unified = ModelType::object();
                for level in 0.. {
                    let Some(first) = chains[0].get(level) else {
                        break;
                    };
                    let shared = chains[1..].iter().all(|chain| {
                        chain
                            .get(level)
                            .is_some_and(|other| other.structurally_equals(first, &self.model.types))
                    });
                    if !shared {
                        break;
                    }
                    unified = first.clone();
                }
                Response::new(Some(unified), headers)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_prefixes_ignore_case() {
        assert!(is_json("application/json"));
        assert!(is_json("Application/JSON; charset=utf-8"));
        assert!(is_xml("application/xml"));
        assert!(!is_json("text/json"));
        assert!(!is_xml("app"));
        assert!(produces_deserializable(&["image/png".into(), "application/json".into()]));
        assert!(!produces_deserializable(&["application/octet-stream".into()]));
    }
}
