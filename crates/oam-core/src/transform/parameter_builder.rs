use serde_json::Value;

use super::collection_format::collection_format;
use super::context::BuildContext;
use super::primitive_builder::schema_facets;
use crate::error::TransformError;
use crate::ir::{self, CollectionFormat, ModelType, Property};
use crate::parse::extensions::X_MS_ENUM;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::{
    PARAMETERS, ParameterTarget, REQUEST_BODIES, SchemaId, reference_name, strip_component_path,
};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::schema::{DataType, Schema};

/// A parameter as declared, before it is turned into a method parameter.
#[derive(Debug, Clone)]
pub(crate) struct SourceParameter {
    pub parameter: Parameter,
    /// Reached through a `$ref` into the parameter components.
    pub from_reference: bool,
    /// Identity of the parameter's schema node.
    pub schema_id: SchemaId,
}

fn ir_location(location: ParameterLocation) -> ir::ParameterLocation {
    match location {
        ParameterLocation::Query => ir::ParameterLocation::Query,
        ParameterLocation::Header => ir::ParameterLocation::Header,
        ParameterLocation::Path => ir::ParameterLocation::Path,
        ParameterLocation::Cookie => ir::ParameterLocation::Cookie,
        ParameterLocation::FormData => ir::ParameterLocation::FormData,
        ParameterLocation::Body => ir::ParameterLocation::Body,
    }
}

/// Body parameters that clash with a non-body name get `Body` appended; a
/// query parameter that shadows a path parameter becomes required.
fn deduplicate(sources: &mut [SourceParameter]) {
    let snapshot: Vec<(String, ParameterLocation)> = sources
        .iter()
        .map(|s| (s.parameter.name.clone(), s.parameter.location))
        .collect();
    for source in sources.iter_mut() {
        let parameter = &mut source.parameter;
        if parameter.location == ParameterLocation::Body {
            while snapshot.iter().any(|(name, location)| {
                *location != ParameterLocation::Body && name.eq_ignore_ascii_case(&parameter.name)
            }) {
                parameter.name.push_str("Body");
            }
        }
        if parameter.location == ParameterLocation::Query
            && snapshot.iter().any(|(name, location)| {
                *location == ParameterLocation::Path && name.eq_ignore_ascii_case(&parameter.name)
            })
        {
            parameter.required = true;
        }
    }
}

impl<'a> BuildContext<'a> {
    /// Path-level parameters followed by the operation's own, with the
    /// request body recast into parameters.
    pub(crate) fn collect_parameters(
        &self,
        path_item: &'a PathItem,
        operation: &'a Operation,
        path_pointer: &SchemaId,
        operation_pointer: &SchemaId,
    ) -> Result<Vec<SourceParameter>, TransformError> {
        let mut merged =
            self.source_parameters(&path_item.parameters, &path_pointer.child("parameters"))?;
        let own =
            self.source_parameters(&operation.parameters, &operation_pointer.child("parameters"))?;
        for source in own {
            let slot = merged.iter_mut().find(|m| {
                m.parameter.name == source.parameter.name
                    && m.parameter.location == source.parameter.location
            });
            match slot {
                Some(slot) => *slot = source,
                None => merged.push(source),
            }
        }

        if let Some(body) = &operation.request_body {
            let pointer = match body {
                RequestBodyOrRef::Ref { ref_path } => SchemaId::new(format!(
                    "#/components/{REQUEST_BODIES}/{}",
                    strip_component_path(ref_path, REQUEST_BODIES)
                )),
                RequestBodyOrRef::RequestBody(_) => operation_pointer.child("requestBody"),
            };
            let body = self.resolver.resolve_request_body(body)?;
            let recast = self.recast_request_body(body, &pointer)?;
            match body.parameter_index() {
                Some(index) if index <= merged.len() => {
                    merged.splice(index..index, recast);
                }
                _ => merged.extend(recast),
            }
        }
        Ok(merged)
    }

    fn source_parameters(
        &self,
        declared: &'a [ParameterOrRef],
        pointer: &SchemaId,
    ) -> Result<Vec<SourceParameter>, TransformError> {
        let mut out = Vec::new();
        for (index, declared) in declared.iter().enumerate() {
            match declared {
                ParameterOrRef::Parameter(parameter) => out.push(SourceParameter {
                    parameter: (**parameter).clone(),
                    from_reference: false,
                    schema_id: pointer.child(index).child("schema"),
                }),
                ParameterOrRef::Ref { ref_path } => match self.resolver.resolve_parameter(declared)? {
                    ParameterTarget::Parameter(parameter) => out.push(SourceParameter {
                        parameter: parameter.clone(),
                        from_reference: true,
                        schema_id: SchemaId::new(format!(
                            "#/components/{PARAMETERS}/{}",
                            strip_component_path(ref_path, PARAMETERS)
                        ))
                        .child("schema"),
                    }),
                    ParameterTarget::RequestBody(body) => {
                        let body_pointer = SchemaId::new(format!(
                            "#/components/{REQUEST_BODIES}/{}",
                            strip_component_path(ref_path, REQUEST_BODIES)
                        ));
                        out.extend(self.recast_request_body(body, &body_pointer)?);
                    }
                },
            }
        }
        Ok(out)
    }

    /// A `multipart/form-data` body becomes one form parameter per property;
    /// any other body becomes a single body parameter.
    fn recast_request_body(
        &self,
        body: &'a RequestBody,
        pointer: &SchemaId,
    ) -> Result<Vec<SourceParameter>, TransformError> {
        let schema_id = match body.content.keys().next() {
            Some(media_type) => pointer.child("content").child(media_type).child("schema"),
            None => pointer.child("content"),
        };

        if body.is_form_data() {
            let Some(schema) = body.schema() else {
                return Ok(Vec::new());
            };
            let (id, schema) = self.resolver.unwrap(schema, schema_id)?;
            let expanded = self.resolver.expand_all_of(schema, &id)?;
            let fields = expanded
                .properties
                .iter()
                .map(|(name, (property_id, property))| SourceParameter {
                    parameter: Parameter {
                        name: name.to_string(),
                        location: ParameterLocation::FormData,
                        description: property.description.clone(),
                        required: expanded.is_required(name),
                        deprecated: None,
                        schema: Some((*property).clone()),
                        style: None,
                        explode: None,
                        extensions: body.extensions.clone(),
                    },
                    from_reference: false,
                    schema_id: property_id.clone(),
                })
                .collect();
            return Ok(fields);
        }

        Ok(vec![SourceParameter {
            parameter: Parameter {
                name: body.parameter_name().to_string(),
                location: ParameterLocation::Body,
                description: body.description.clone(),
                required: body.required,
                deprecated: None,
                schema: body.schema().cloned(),
                style: None,
                explode: None,
                extensions: body.extensions.clone(),
            },
            from_reference: false,
            schema_id,
        }])
    }

    /// Turn the collected parameters of one operation into method
    /// parameters.
    pub(crate) fn build_method_parameters(
        &mut self,
        mut sources: Vec<SourceParameter>,
        consumes: &[String],
    ) -> Result<Vec<ir::Parameter>, TransformError> {
        deduplicate(&mut sources);

        let mut parameters = Vec::with_capacity(sources.len());
        for mut source in sources {
            let parameter = &mut source.parameter;
            if parameter.location == ParameterLocation::Header {
                match parameter.name.as_str() {
                    "Accept" | "Authorization" => continue,
                    "Content-Type" => {
                        let constrained = parameter
                            .schema
                            .as_ref()
                            .is_some_and(|s| s.enum_values.is_some());
                        if !constrained && consumes.len() > 1 {
                            let mut schema = parameter
                                .schema
                                .take()
                                .unwrap_or_else(|| Schema::of_type(DataType::String));
                            schema.enum_values =
                                Some(consumes.iter().cloned().map(Value::String).collect());
                            parameter.schema = Some(schema);
                            parameter.required = true;
                            if !parameter.extensions.contains(X_MS_ENUM) {
                                self.content_type_choices.extend(consumes.iter().cloned());
                            }
                        }
                    }
                    _ => {}
                }
            }
            parameters.push(self.build_parameter(&source)?);
        }
        Ok(parameters)
    }

    pub(crate) fn build_parameter(
        &mut self,
        source: &SourceParameter,
    ) -> Result<ir::Parameter, TransformError> {
        let declared = &source.parameter;
        let required = declared.is_required();

        let mut schema = declared.schema.clone();
        if let (Some(schema), Some(extension)) =
            (schema.as_mut(), declared.extensions.get(X_MS_ENUM))
        {
            if !schema.extensions.contains(X_MS_ENUM) {
                schema.extensions.insert(X_MS_ENUM, extension.clone());
            }
        }

        let type_name = schema
            .as_ref()
            .and_then(|s| s.reference.as_deref())
            .map(reference_name)
            .unwrap_or(declared.name.as_str())
            .to_string();

        let (model_type, facets) = match &schema {
            Some(schema) => {
                let model_type =
                    self.build_type(schema, source.schema_id.clone(), &type_name, required)?;
                let (_, target) = self.resolver.unwrap(schema, source.schema_id.clone())?;
                (model_type, schema_facets(target, required))
            }
            None if declared.location == ParameterLocation::Body => {
                return Err(TransformError::MissingBodySchema(declared.name.clone()));
            }
            None => (ModelType::object(), Default::default()),
        };

        let mut format = match declared.location {
            ParameterLocation::Body => CollectionFormat::None,
            location => collection_format(
                location,
                declared.style,
                declared.explode,
                self.options.legacy_collection_format,
            ),
        };
        if format == CollectionFormat::None && matches!(model_type, ModelType::Sequence(_)) {
            format = CollectionFormat::Csv;
        }

        let client_property = if source.from_reference {
            self.model
                .properties
                .iter()
                .position(|p| p.serialized_name.as_deref() == Some(declared.name.as_str()))
        } else {
            None
        };

        Ok(ir::Parameter {
            name: declared.name.clone(),
            serialized_name: declared.name.clone(),
            location: ir_location(declared.location),
            model_type,
            documentation: declared.description.clone().or(facets.documentation),
            default_value: facets.default_value,
            is_required: required,
            is_constant: facets.is_constant,
            deprecated: declared.is_deprecated(),
            collection_format: format,
            constraints: facets.constraints,
            extensions: declared.extensions.clone(),
            client_property,
            is_host_parameter: false,
        })
    }

    /// Project every component parameter into a client-level property.
    pub(crate) fn build_client_properties(&mut self) -> Result<(), TransformError> {
        let document = self.document;
        for (name, declared) in &document.components.parameters {
            let ParameterTarget::Parameter(parameter) = self.resolver.resolve_parameter(declared)?
            else {
                continue;
            };
            let source = SourceParameter {
                parameter: parameter.clone(),
                from_reference: false,
                schema_id: SchemaId::new(format!("#/components/{PARAMETERS}/{name}"))
                    .child("schema"),
            };
            let built = self.build_parameter(&source)?;
            log::debug!("client property {}", built.serialized_name);

            let mut property = Property::new(built.name, built.model_type);
            property.serialized_name = Some(built.serialized_name);
            property.documentation = built.documentation;
            property.default_value = built.default_value;
            property.is_required = built.is_required;
            property.is_constant = built.is_constant;
            property.deprecated = built.deprecated;
            property.constraints = built.constraints;
            property.extensions = built.extensions;
            self.model.properties.push(property);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, location: ParameterLocation) -> SourceParameter {
        SourceParameter {
            parameter: Parameter {
                name: name.to_string(),
                location,
                description: None,
                required: false,
                deprecated: None,
                schema: Some(Schema::of_type(DataType::String)),
                style: None,
                explode: None,
                extensions: Default::default(),
            },
            from_reference: false,
            schema_id: SchemaId::new("#/test"),
        }
    }

    #[test]
    fn body_clashing_with_path_name_gets_suffix() {
        let mut sources = vec![
            source("pet", ParameterLocation::Path),
            source("Pet", ParameterLocation::Body),
        ];
        deduplicate(&mut sources);
        assert_eq!(sources[1].parameter.name, "PetBody");
        assert_eq!(sources[0].parameter.name, "pet");
    }

    #[test]
    fn query_shadowing_path_becomes_required() {
        let mut sources = vec![
            source("id", ParameterLocation::Path),
            source("id", ParameterLocation::Query),
            source("filter", ParameterLocation::Query),
        ];
        deduplicate(&mut sources);
        assert!(sources[1].parameter.required);
        assert!(!sources[2].parameter.required);
    }
}
