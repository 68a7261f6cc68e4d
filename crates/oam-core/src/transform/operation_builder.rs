use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use super::context::BuildContext;
use super::response_builder::{APPLICATION_JSON, is_json, is_xml};
use crate::error::TransformError;
use crate::ir::{ForwardTarget, HttpMethod, Method, Response};
use crate::parse::extensions::{X_DEPRECATED, X_MS_FORWARD_TO, X_MS_NO_WIRE};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::ref_resolve::SchemaId;

const DEPRECATED: &str = "This operation is deprecated. Please do not use it any longer.";

/// Where an operation sits in the document.
pub(crate) struct OperationSite<'a> {
    pub http_method: HttpMethod,
    pub path: &'a str,
    pub path_item: &'a PathItem,
    pub operation: &'a Operation,
    pub path_pointer: SchemaId,
}

impl OperationSite<'_> {
    fn pointer(&self) -> SchemaId {
        self.path_pointer
            .child(self.http_method.as_str().to_ascii_lowercase())
    }
}

/// Request content type: first JSON, then first XML, then first declared,
/// else JSON. JSON and XML get a UTF-8 charset unless one is given.
pub fn negotiate_content_type(consumes: &[String]) -> String {
    let chosen = consumes
        .iter()
        .find(|c| is_json(c))
        .or_else(|| consumes.iter().find(|c| is_xml(c)))
        .or_else(|| consumes.first())
        .map(String::as_str)
        .unwrap_or(APPLICATION_JSON);
    if (is_json(chosen) || is_xml(chosen)) && !chosen.to_ascii_lowercase().contains("charset=") {
        format!("{chosen}; charset=utf-8")
    } else {
        chosen.to_string()
    }
}

fn deprecation_message(operation: &Operation) -> Option<String> {
    match operation.extensions.get(X_DEPRECATED) {
        Some(details) => {
            if let Some(description) = details.get("description").and_then(Value::as_str) {
                return Some(description.to_string());
            }
            Some(match details.get("replaced-by").and_then(Value::as_str) {
                Some(target) => {
                    format!("This operation is deprecated. Please use {target} instead.")
                }
                None => DEPRECATED.to_string(),
            })
        }
        None => operation.is_deprecated().then(|| DEPRECATED.to_string()),
    }
}

impl<'a> BuildContext<'a> {
    /// Build one operation into a method.
    pub(crate) fn build_method(
        &mut self,
        site: &OperationSite<'a>,
        name: String,
        group: Option<String>,
    ) -> Result<Method, TransformError> {
        let operation = site.operation;
        let pointer = site.pointer();
        let serialized_name = operation.operation_id.clone().unwrap_or_default();
        log::debug!("building method {serialized_name} ({} {})", site.http_method.as_str(), site.path);

        let consumes = self.effective_consumes(operation)?;
        let produces = self.effective_produces(operation)?;

        let url = match site.path.split_once('?') {
            Some((url, _)) => url,
            None => site.path,
        };

        let mut method = Method {
            name,
            group,
            serialized_name,
            http_method: site.http_method,
            url: Some(url.to_string()),
            forward_to: None,
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            external_docs_url: operation.external_docs.as_ref().map(|d| d.url.clone()),
            deprecation_message: deprecation_message(operation),
            tags: operation.tags.clone(),
            security: operation
                .security
                .clone()
                .or_else(|| self.document.security.clone())
                .unwrap_or_default(),
            request_content_type: negotiate_content_type(&consumes),
            response_content_types: produces.clone(),
            parameters: Vec::new(),
            responses: IndexMap::new(),
            default_response: Response::default(),
            return_type: Response::default(),
            extensions: operation.extensions.clone(),
        };

        if operation.extensions.flag(X_MS_NO_WIRE) {
            method.url = None;
        }
        if let Some(target) = operation.extensions.str_value(X_MS_FORWARD_TO) {
            method.url = None;
            method.forward_to = Some(ForwardTarget::Pending(target.to_string()));
        }

        let sources =
            self.collect_parameters(site.path_item, operation, &site.path_pointer, &pointer)?;
        method.parameters = self.build_method_parameters(sources, &consumes)?;

        let headers = self.build_response_headers(&method, operation, &pointer)?;
        let candidates = self.build_responses(&mut method, operation, &produces, headers, &pointer)?;

        method.return_type = self.unify_return_type(&candidates, headers);
        if method.responses.is_empty() {
            method.return_type = method.default_response.clone();
        }
        if let Some(headers) = method.return_type.headers {
            self.add_header_type(headers);
        }
        Ok(method)
    }

    /// Explicit `consumes`, else the request body's media types.
    fn effective_consumes(&self, operation: &'a Operation) -> Result<Vec<String>, TransformError> {
        if let Some(consumes) = &operation.consumes {
            return Ok(consumes.clone());
        }
        match &operation.request_body {
            Some(body) => Ok(self
                .resolver
                .resolve_request_body(body)?
                .content
                .keys()
                .cloned()
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Explicit `produces`, else the union of the response media types. A
    /// lone wildcard reads as JSON.
    fn effective_produces(&self, operation: &'a Operation) -> Result<Vec<String>, TransformError> {
        let mut produces = match &operation.produces {
            Some(produces) => produces.clone(),
            None => {
                let mut union = IndexSet::new();
                for response in operation.responses.values() {
                    let response = self.resolver.resolve_response(response)?;
                    union.extend(response.content.keys().cloned());
                }
                union.into_iter().collect()
            }
        };
        if produces.len() == 1 && produces[0] == "*/*" {
            produces = vec![APPLICATION_JSON.to_string()];
        }
        Ok(produces)
    }
}
