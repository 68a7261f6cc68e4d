use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::TransformOptions;
use crate::ir::{CodeModel, CompositeTypeId, KnownPrimaryType, ModelType};
use crate::parse::ref_resolve::{Resolver, SchemaId};
use crate::parse::spec::ServiceDefinition;

/// Mutable state shared by every builder during one document build.
///
/// The builders are split across modules as separate `impl` blocks on this
/// type, so each of them sees the memo tables and the model under
/// construction.
pub struct BuildContext<'a> {
    pub(crate) document: &'a ServiceDefinition,
    pub(crate) options: &'a TransformOptions,
    pub(crate) resolver: Resolver<'a>,
    pub(crate) model: CodeModel,
    /// Named composites by their final (possibly decorated) name.
    pub(crate) generated_types: IndexMap<String, CompositeTypeId>,
    /// Composites by schema identity, including ones still being built.
    pub(crate) generating_types: HashMap<SchemaId, CompositeTypeId>,
    /// Type name to the component name of its parent.
    pub(crate) extended_types: IndexMap<String, String>,
    /// Media types collected from synthesized `Content-Type` parameters.
    pub(crate) content_type_choices: IndexSet<String>,
    /// Names of types flagged as error models by some operation.
    pub(crate) error_seeds: IndexSet<String>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        document: &'a ServiceDefinition,
        options: &'a TransformOptions,
        model: CodeModel,
    ) -> Self {
        Self {
            document,
            options,
            resolver: Resolver::new(document),
            model,
            generated_types: IndexMap::new(),
            generating_types: HashMap::new(),
            extended_types: IndexMap::new(),
            content_type_choices: IndexSet::new(),
            error_seeds: IndexSet::new(),
        }
    }

    pub fn finish(self) -> CodeModel {
        self.model
    }

    /// Inheritance chain of `model_type`, root first. The generic object
    /// type is always the root; parents are looked up by name since base
    /// types are only wired once every type exists.
    pub(crate) fn inheritance_chain(&self, model_type: &ModelType) -> Vec<ModelType> {
        let mut chain = vec![model_type.clone()];
        let mut current = model_type.as_composite();
        while let Some(id) = current {
            let parent = self
                .extended_types
                .get(&self.model.types[id].name)
                .and_then(|name| self.generated_types.get(name))
                .copied();
            match parent {
                Some(parent) if !chain.contains(&ModelType::Composite(parent)) => {
                    chain.push(ModelType::Composite(parent));
                    current = Some(parent);
                }
                _ => current = None,
            }
        }
        if !model_type.is_primary(KnownPrimaryType::Object) {
            chain.push(ModelType::object());
        }
        chain.reverse();
        chain
    }

    pub(crate) fn add_error_type(&mut self, id: CompositeTypeId) {
        if !self.model.error_types.contains(&id) {
            self.model.error_types.push(id);
        }
    }

    pub(crate) fn add_header_type(&mut self, id: CompositeTypeId) {
        if !self.model.header_types.contains(&id) {
            self.model.header_types.push(id);
        }
    }
}
