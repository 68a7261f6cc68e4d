use indexmap::IndexSet;
use serde_json::Value;

use super::TransformOptions;
use super::context::BuildContext;
use super::operation_builder::OperationSite;
use super::parameter_builder::SourceParameter;
use crate::error::TransformError;
use crate::ir::*;
use crate::parse::extensions::X_MS_PARAMETERIZED_HOST;
use crate::parse::operation::PathItem;
use crate::parse::parameter::{Parameter as DocParameter, ParameterLocation as DocLocation};
use crate::parse::ref_resolve::SchemaId;
use crate::parse::schema::{DataType, Schema};
use crate::parse::spec::ServiceDefinition;

const DEFAULT_BASE_URL: &str = "http://localhost";

/// Build the code model of a document with default options.
pub fn transform(document: &ServiceDefinition) -> Result<CodeModel, TransformError> {
    transform_with_options(document, &TransformOptions::default())
}

/// Build the code model of a document.
pub fn transform_with_options(
    document: &ServiceDefinition,
    options: &TransformOptions,
) -> Result<CodeModel, TransformError> {
    // Phase 1: Model metadata
    let model = initialize_model(document, options)?;
    let mut ctx = BuildContext::new(document, options, model);

    // Phase 2: Named component schemas
    build_component_types(&mut ctx)?;

    // Phase 3: Global parameters as client properties
    ctx.build_client_properties()?;

    // Phase 4: Operations
    build_methods(&mut ctx)?;

    // Phase 5: Forward-to targets
    resolve_forward_targets(&mut ctx.model)?;

    // Phase 6: Base types and error models
    wire_base_types(&mut ctx)?;

    // Phase 7: Shared content type enum
    build_content_types(&mut ctx);

    // Phase 8: Parameterized host
    build_host_parameters(&mut ctx)?;

    Ok(ctx.finish())
}

fn initialize_model(
    document: &ServiceDefinition,
    options: &TransformOptions,
) -> Result<CodeModel, TransformError> {
    let info = document
        .info
        .as_ref()
        .ok_or(TransformError::InfoSectionMissing)?;
    let name = match (&info.title, &options.client_name) {
        (Some(title), _) => title.replace(' ', ""),
        (None, Some(client_name)) if !client_name.trim().is_empty() => client_name.clone(),
        _ => return Err(TransformError::TitleMissing),
    };

    let mut model = CodeModel::new(name, options.namespace.clone());
    model.models_name = options.models_name.clone();
    model.api_version = Some(info.version.clone()).filter(|v| !v.is_empty());
    model.documentation = info.description.clone();
    model.base_url = document
        .servers
        .first()
        .map(|s| s.url.trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    model.extensions = document.extensions.clone();
    model.code_gen_extensions = info.code_generation_settings.clone();
    Ok(model)
}

fn build_component_types(ctx: &mut BuildContext<'_>) -> Result<(), TransformError> {
    let document = ctx.document;
    for (name, schema) in &document.components.schemas {
        ctx.resolver.ancestors(name)?;
        ctx.build_type(schema, SchemaId::component(name), name, false)?;

        if let Some(parent) = ctx.resolver.parent_of(name)? {
            if !ctx.options.generate_empty_classes
                && !ctx.resolver.ancestors_have_properties(&parent)?
            {
                return Err(TransformError::InvalidAncestors(name.clone()));
            }
        }
    }
    Ok(())
}

fn build_methods(ctx: &mut BuildContext<'_>) -> Result<(), TransformError> {
    let document = ctx.document;
    for (path, item) in &document.paths {
        let pointer = SchemaId::new("#/paths").child(path);
        collect_methods(ctx, path, item, pointer)?;
    }
    for (path, item) in &document.custom_paths {
        let pointer = SchemaId::new("#/x-ms-paths").child(path);
        collect_methods(ctx, path, item, pointer)?;
    }
    Ok(())
}

fn collect_methods<'a>(
    ctx: &mut BuildContext<'a>,
    path: &'a str,
    item: &'a PathItem,
    path_pointer: SchemaId,
) -> Result<(), TransformError> {
    macro_rules! add_op {
        ($method:expr, $op:expr) => {
            if let Some(ref operation) = $op {
                let site = OperationSite {
                    http_method: $method,
                    path,
                    path_item: item,
                    operation,
                    path_pointer: path_pointer.clone(),
                };
                add_method(ctx, &site)?;
            }
        };
    }

    add_op!(HttpMethod::Get, item.get);
    add_op!(HttpMethod::Put, item.put);
    add_op!(HttpMethod::Post, item.post);
    add_op!(HttpMethod::Delete, item.delete);
    add_op!(HttpMethod::Options, item.options);
    add_op!(HttpMethod::Head, item.head);
    add_op!(HttpMethod::Patch, item.patch);
    add_op!(HttpMethod::Trace, item.trace);

    Ok(())
}

fn add_method<'a>(ctx: &mut BuildContext<'a>, site: &OperationSite<'a>) -> Result<(), TransformError> {
    if site.http_method == HttpMethod::Options {
        log::warn!("OPTIONS operations are not supported, skipping OPTIONS {}", site.path);
        return Ok(());
    }

    let operation_id = site
        .operation
        .operation_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| TransformError::OperationIdMissing {
            verb: site.http_method.as_str().to_string(),
            path: site.path.to_string(),
        })?;

    let (group, name) = match operation_id.split_once('_') {
        Some((group, name)) if !group.is_empty() => (Some(group.to_string()), name.to_string()),
        Some((_, name)) => (None, name.to_string()),
        None => (None, operation_id.to_string()),
    };
    if ctx
        .model
        .methods
        .iter()
        .any(|m| m.group == group && m.name == name)
    {
        return Err(TransformError::DuplicateOperationId(operation_id.to_string()));
    }

    let method = ctx.build_method(site, name, group)?;
    ctx.model.methods.push(method);
    Ok(())
}

fn resolve_forward_targets(model: &mut CodeModel) -> Result<(), TransformError> {
    let serialized: Vec<String> = model
        .methods
        .iter()
        .map(|m| m.serialized_name.clone())
        .collect();
    for method in &mut model.methods {
        let Some(ForwardTarget::Pending(target)) = &method.forward_to else {
            continue;
        };
        let index = serialized.iter().position(|s| s == target).ok_or_else(|| {
            TransformError::CodeGeneration(format!(
                "Cannot forward to '{target}'. No method with that name found."
            ))
        })?;
        method.forward_to = Some(ForwardTarget::Resolved(index));
    }

    for id in model.types.ids().collect::<Vec<_>>() {
        let composite = &mut model.types[id];
        let names: Vec<Option<String>> = composite
            .properties
            .iter()
            .map(|p| p.serialized_name.clone())
            .collect();
        for property in &mut composite.properties {
            let Some(ForwardTarget::Pending(target)) = &property.forward_to else {
                continue;
            };
            let index = names
                .iter()
                .position(|n| n.as_deref() == Some(target.as_str()))
                .ok_or_else(|| {
                    TransformError::CodeGeneration(format!(
                        "Cannot forward to '{target}'. No property with that name found."
                    ))
                })?;
            property.forward_to = Some(ForwardTarget::Resolved(index));
        }
    }
    Ok(())
}

fn wire_base_types(ctx: &mut BuildContext<'_>) -> Result<(), TransformError> {
    for (name, id) in &ctx.generated_types {
        if let Some(parent) = ctx.extended_types.get(name) {
            let base = ctx
                .generated_types
                .get(parent)
                .copied()
                .ok_or_else(|| TransformError::InvalidAncestors(name.clone()))?;
            ctx.model.types[*id].base_type = Some(base);
        }
    }

    let named: IndexSet<CompositeTypeId> = ctx.generated_types.values().copied().collect();
    ctx.model.model_types = named.into_iter().collect();

    for id in ctx.model.model_types.clone() {
        if ctx.model.is_error_type(id) {
            continue;
        }
        let descends_from_error = ctx
            .model
            .base_chain(id)
            .iter()
            .skip(1)
            .any(|ancestor| ctx.error_seeds.contains(&ctx.model.types[*ancestor].name));
        if descends_from_error {
            ctx.add_error_type(id);
        }
    }
    Ok(())
}

fn build_content_types(ctx: &mut BuildContext<'_>) {
    if ctx.content_type_choices.is_empty() {
        return;
    }
    let values = ctx
        .content_type_choices
        .iter()
        .map(|choice| EnumValue {
            name: choice.clone(),
            serialized_name: choice.clone(),
            description: None,
            allowed_values: Vec::new(),
        })
        .collect();
    ctx.model.enum_types.push(EnumType {
        name: "ContentTypes".to_string(),
        underlying_type: KnownPrimaryType::String,
        values,
        model_as_string: true,
        old_model_as_string: false,
        documentation: None,
    });
}

fn build_host_parameters(ctx: &mut BuildContext<'_>) -> Result<(), TransformError> {
    let document = ctx.document;
    let Some(server) = document.servers.first() else {
        return Ok(());
    };
    if server.variables.is_empty() {
        return Ok(());
    }

    ctx.model
        .extensions
        .insert(X_MS_PARAMETERIZED_HOST, Value::Bool(true));
    let position = server
        .extensions
        .get(X_MS_PARAMETERIZED_HOST)
        .and_then(|host| host.get("positionInOperation"))
        .and_then(Value::as_str)
        .unwrap_or("first");

    let pointer = SchemaId::new("#/servers/0/variables");
    let mut host_parameters = Vec::with_capacity(server.variables.len());
    for (name, variable) in &server.variables {
        let mut schema = Schema::of_type(DataType::String);
        if !variable.default.is_empty() {
            schema.default_value = Some(Value::String(variable.default.clone()));
        }
        if !variable.enum_values.is_empty() {
            schema.enum_values = Some(
                variable
                    .enum_values
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            );
        }
        let source = SourceParameter {
            parameter: DocParameter {
                name: name.clone(),
                location: DocLocation::Path,
                description: variable.description.clone(),
                required: true,
                deprecated: None,
                schema: Some(schema),
                style: None,
                explode: None,
                extensions: variable.extensions.clone(),
            },
            from_reference: false,
            schema_id: pointer.child(name).child("schema"),
        };
        let mut parameter = ctx.build_parameter(&source)?;
        parameter.client_property = ctx.model.properties.iter().position(|p| {
            p.serialized_name
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(&parameter.serialized_name))
        });
        parameter.is_host_parameter = true;
        host_parameters.push(parameter);
    }

    if position.eq_ignore_ascii_case("first") {
        host_parameters.reverse();
        ctx.model.host_parameters_front = host_parameters;
    } else if position.eq_ignore_ascii_case("last") {
        ctx.model.host_parameters_back = host_parameters;
    } else {
        return Err(TransformError::InvalidHostPosition(position.to_string()));
    }
    Ok(())
}
