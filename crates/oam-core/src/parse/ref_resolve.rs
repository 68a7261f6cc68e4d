use std::fmt;

use indexmap::IndexMap;

use super::components::Components;
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Header, HeaderOrRef, Response, ResponseOrRef};
use super::schema::Schema;
use super::spec::ServiceDefinition;
use crate::error::ResolveError;

pub const SCHEMAS: &str = "schemas";
pub const PARAMETERS: &str = "parameters";
pub const REQUEST_BODIES: &str = "requestBodies";
pub const RESPONSES: &str = "responses";
pub const HEADERS: &str = "headers";

/// Strip everything up to and including `components/<section>/`. A reference
/// without that prefix is returned unchanged and looked up verbatim.
pub fn strip_component_path<'r>(reference: &'r str, section: &str) -> &'r str {
    let marker = format!("components/{section}/");
    match reference.find(&marker) {
        Some(index) => &reference[index + marker.len()..],
        None => reference,
    }
}

/// Last segment of a reference, used as a type name hint.
pub fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Stable identity of a schema node: the JSON pointer of the node that
/// actually defines it. References resolve to the pointer of their target,
/// so two paths reaching the same definition share one id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    pub fn component(name: &str) -> Self {
        Self(format!("#/components/{SCHEMAS}/{}", escape_segment(name)))
    }

    pub fn child(&self, segment: impl fmt::Display) -> Self {
        Self(format!("{}/{}", self.0, escape_segment(&segment.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// What a parameter reference points at.
#[derive(Debug, Clone, Copy)]
pub enum ParameterTarget<'a> {
    Parameter(&'a Parameter),
    RequestBody(&'a RequestBody),
}

/// A schema with its `allOf` members flattened into one property set.
#[derive(Debug, Default)]
pub struct ExpandedSchema<'s> {
    /// Component name of the inheritance parent (first referenced `allOf`
    /// member).
    pub parent: Option<String>,
    pub properties: IndexMap<&'s str, (SchemaId, &'s Schema)>,
    pub required: Vec<&'s str>,
}

impl ExpandedSchema<'_> {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(&name)
    }
}

/// Dereferences `$ref` pointers into the component sections of one document.
pub struct Resolver<'a> {
    components: &'a Components,
}

impl<'a> Resolver<'a> {
    pub fn new(document: &'a ServiceDefinition) -> Self {
        Self {
            components: &document.components,
        }
    }

    /// Look up a schema by reference or bare component name.
    pub fn dereference(&self, reference: &str) -> Result<&'a Schema, ResolveError> {
        lookup(&self.components.schemas, reference, SCHEMAS)
    }

    /// Follow bare references (and trivial single-`allOf` wrappers) until a
    /// node with real content is reached. The returned id is the pointer of
    /// that node.
    pub fn unwrap<'s>(
        &self,
        schema: &'s Schema,
        id: SchemaId,
    ) -> Result<(SchemaId, &'s Schema), ResolveError>
    where
        'a: 's,
    {
        let mut current = schema;
        let mut id = id;
        let mut seen: Vec<String> = Vec::new();
        loop {
            if current.is_bare_reference() {
                let reference = current.reference.as_deref().unwrap_or_default();
                let name = strip_component_path(reference, SCHEMAS);
                if seen.iter().any(|s| s == name) {
                    return Err(ResolveError::CircularRef(reference.to_string()));
                }
                seen.push(name.to_string());
                current = self.dereference(reference)?;
                id = SchemaId::component(name);
                continue;
            }
            if let Some(inner) = current.single_all_of_wrapper() {
                current = inner;
                id = id.child("allOf").child(0);
                continue;
            }
            return Ok((id, current));
        }
    }

    /// Flatten `allOf` members into one property view. The first bare
    /// reference member becomes the parent; every other member contributes
    /// its properties and required names.
    pub fn expand_all_of<'s>(
        &self,
        schema: &'s Schema,
        id: &SchemaId,
    ) -> Result<ExpandedSchema<'s>, ResolveError>
    where
        'a: 's,
    {
        let mut expanded = ExpandedSchema::default();
        let mut visiting = Vec::new();
        self.collect_members(schema, id, true, &mut expanded, &mut visiting)?;
        Ok(expanded)
    }

    fn collect_members<'s>(
        &self,
        schema: &'s Schema,
        id: &SchemaId,
        take_parent: bool,
        out: &mut ExpandedSchema<'s>,
        visiting: &mut Vec<SchemaId>,
    ) -> Result<(), ResolveError>
    where
        'a: 's,
    {
        if visiting.contains(id) {
            return Err(ResolveError::CircularRef(id.to_string()));
        }
        visiting.push(id.clone());

        for (index, member) in schema.all_of.iter().enumerate() {
            if take_parent && out.parent.is_none() && member.is_bare_reference() {
                out.parent = member
                    .reference
                    .as_deref()
                    .map(|r| strip_component_path(r, SCHEMAS).to_string());
                continue;
            }
            let (member_id, member) = self.unwrap(member, id.child("allOf").child(index))?;
            self.collect_members(member, &member_id, false, out, visiting)?;
        }

        for (name, property) in &schema.properties {
            out.properties.insert(
                name.as_str(),
                (id.child("properties").child(name), property),
            );
        }
        for name in &schema.required {
            if !out.required.contains(&name.as_str()) {
                out.required.push(name);
            }
        }

        visiting.pop();
        Ok(())
    }

    /// Parent component name of a named component schema.
    pub fn parent_of(&self, name: &str) -> Result<Option<String>, ResolveError> {
        let schema = self.dereference(name)?;
        let (id, schema) = self.unwrap(schema, SchemaId::component(name))?;
        Ok(self.expand_all_of(schema, &id)?.parent)
    }

    /// Ancestors of a component schema, nearest first. Fails on a cycle.
    pub fn ancestors(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let mut chain = vec![name.to_string()];
        let mut current = name.to_string();
        while let Some(parent) = self.parent_of(&current)? {
            if chain.contains(&parent) {
                chain.push(parent);
                return Err(ResolveError::CircularRef(format!(
                    "inheritance chain {}",
                    chain.join(" -> ")
                )));
            }
            chain.push(parent.clone());
            current = parent;
        }
        Ok(chain.split_off(1))
    }

    /// Whether the chain starting at `name` (inclusive) declares at least one
    /// property anywhere.
    pub fn ancestors_have_properties(&self, name: &str) -> Result<bool, ResolveError> {
        let mut chain = vec![name.to_string()];
        chain.extend(self.ancestors(name)?);
        for ancestor in &chain {
            let schema = self.dereference(ancestor)?;
            let (id, schema) = self.unwrap(schema, SchemaId::component(ancestor))?;
            if !self.expand_all_of(schema, &id)?.properties.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Resolve a parameter reference. References into `requestBodies` yield
    /// the request body; everything else goes through `parameters`.
    pub fn resolve_parameter(
        &self,
        parameter: &'a ParameterOrRef,
    ) -> Result<ParameterTarget<'a>, ResolveError> {
        let mut current = parameter;
        let mut seen: Vec<&str> = Vec::new();
        loop {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(ParameterTarget::Parameter(p)),
                ParameterOrRef::Ref { ref_path } => {
                    if ref_path.contains(&format!("components/{REQUEST_BODIES}/")) {
                        return Ok(ParameterTarget::RequestBody(
                            self.dereference_request_body(ref_path)?,
                        ));
                    }
                    if seen.contains(&ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    seen.push(ref_path);
                    current = lookup(&self.components.parameters, ref_path, PARAMETERS)?;
                }
            }
        }
    }

    pub fn resolve_request_body(
        &self,
        body: &'a RequestBodyOrRef,
    ) -> Result<&'a RequestBody, ResolveError> {
        match body {
            RequestBodyOrRef::RequestBody(b) => Ok(b),
            RequestBodyOrRef::Ref { ref_path } => self.dereference_request_body(ref_path),
        }
    }

    fn dereference_request_body(&self, reference: &str) -> Result<&'a RequestBody, ResolveError> {
        let mut current = reference.to_string();
        let mut seen = Vec::new();
        loop {
            if seen.contains(&current) {
                return Err(ResolveError::CircularRef(current));
            }
            match lookup(&self.components.request_bodies, &current, REQUEST_BODIES)? {
                RequestBodyOrRef::RequestBody(b) => return Ok(b),
                RequestBodyOrRef::Ref { ref_path } => {
                    seen.push(current);
                    current = ref_path.clone();
                }
            }
        }
    }

    pub fn resolve_response(
        &self,
        response: &'a ResponseOrRef,
    ) -> Result<&'a Response, ResolveError> {
        let mut current = response;
        let mut seen: Vec<&str> = Vec::new();
        loop {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    if seen.contains(&ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    seen.push(ref_path);
                    current = lookup(&self.components.responses, ref_path, RESPONSES)?;
                }
            }
        }
    }

    pub fn resolve_header(&self, header: &'a HeaderOrRef) -> Result<&'a Header, ResolveError> {
        let mut current = header;
        let mut seen: Vec<&str> = Vec::new();
        loop {
            match current {
                HeaderOrRef::Header(h) => return Ok(h),
                HeaderOrRef::Ref { ref_path } => {
                    if seen.contains(&ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    seen.push(ref_path);
                    current = lookup(&self.components.headers, ref_path, HEADERS)?;
                }
            }
        }
    }
}

fn lookup<'m, T>(
    map: &'m IndexMap<String, T>,
    reference: &str,
    section: &str,
) -> Result<&'m T, ResolveError> {
    map.get(strip_component_path(reference, section))
        .ok_or_else(|| ResolveError::UnresolvedRef(reference.to_string()))
}
