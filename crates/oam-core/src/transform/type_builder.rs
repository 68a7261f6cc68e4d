use super::context::BuildContext;
use super::primitive_builder::schema_facets;
use crate::error::TransformError;
use crate::ir::{CompositeType, CompositeTypeId, ForwardTarget, KnownPrimaryType, ModelType, Property};
use crate::parse::extensions::{X_MS_DISCRIMINATOR_VALUE, X_MS_ENUM, X_MS_FORWARD_TO, X_MS_NO_WIRE};
use crate::parse::ref_resolve::{SchemaId, reference_name};
use crate::parse::schema::{DataType, Schema};

const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
const ADDITIONAL_PROPERTIES_DOC: &str =
    "Unmatched properties from the message are deserialized this collection";

/// How a resolved schema node is turned into a model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaShape {
    /// Enums, arrays, dictionaries and scalars.
    Primitive,
    /// Object-ish nodes with nothing to model.
    Opaque(KnownPrimaryType),
    Composite,
}

fn classify(schema: &Schema, generate_empty_classes: bool) -> SchemaShape {
    let data_type = schema.data_type();
    let is_object = data_type == Some(&DataType::Object);
    let memberless = schema.properties.is_empty() && schema.all_of.is_empty();

    if data_type.is_some() && !is_object {
        return SchemaShape::Primitive;
    }
    if memberless
        && (schema.additional_properties_schema().is_some() || schema.enum_values.is_some())
    {
        return SchemaShape::Primitive;
    }
    if is_object && schema.format.as_deref() == Some("file") {
        return SchemaShape::Opaque(KnownPrimaryType::Stream);
    }
    if memberless && !(generate_empty_classes && is_object) {
        return SchemaShape::Opaque(KnownPrimaryType::Object);
    }
    SchemaShape::Composite
}

impl<'a> BuildContext<'a> {
    /// Build the model type of `schema`. `name` is the hint used when the
    /// node defines a new named type; a plain reference names the type after
    /// its target instead.
    pub fn build_type<'s>(
        &mut self,
        schema: &'s Schema,
        id: SchemaId,
        name: &str,
        required: bool,
    ) -> Result<ModelType, TransformError>
    where
        'a: 's,
    {
        let name = match schema.reference.as_deref() {
            Some(reference) if schema.is_bare_reference() => reference_name(reference),
            _ => name,
        };
        let (id, resolved) = self.resolver.unwrap(schema, id)?;

        // An enum reached through a reference is documented by the referrer.
        let documented;
        let resolved = if schema.is_bare_reference()
            && resolved.enum_values.is_some()
            && schema.description.is_some()
        {
            documented = Schema {
                description: schema.description.clone(),
                ..resolved.clone()
            };
            &documented
        } else {
            resolved
        };

        if resolved.enum_values.is_none() && resolved.extensions.contains(X_MS_ENUM) {
            return Err(TransformError::DanglingEnumExtension(name.to_string()));
        }

        match classify(resolved, self.options.generate_empty_classes) {
            SchemaShape::Primitive => self.build_primitive(resolved, &id, name, required),
            SchemaShape::Opaque(kind) => Ok(ModelType::primary(kind)),
            SchemaShape::Composite => self
                .build_composite(resolved, id, name)
                .map(ModelType::Composite),
        }
    }

    fn build_composite<'s>(
        &mut self,
        schema: &'s Schema,
        id: SchemaId,
        name: &str,
    ) -> Result<CompositeTypeId, TransformError>
    where
        'a: 's,
    {
        if let Some(existing) = self.generating_types.get(&id) {
            return Ok(*existing);
        }
        log::debug!("building composite {name} from {id}");

        // Register before descending so recursive references find the slot.
        let local_id = self.model.types.alloc(CompositeType::new(name));
        self.generating_types.insert(id.clone(), local_id);

        let expanded = self.resolver.expand_all_of(schema, &id)?;

        let mut composite = CompositeType::new(name);
        composite.documentation = schema.description.clone();
        composite.summary = schema.title.clone();
        composite.external_docs_url = schema.external_docs.as_ref().map(|d| d.url.clone());
        composite.deprecated = schema.is_deprecated();
        composite.extensions = schema.effective_extensions();
        composite.polymorphic_discriminator = schema.discriminator_name().map(str::to_string);
        if let Some(value) = schema.extensions.str_value(X_MS_DISCRIMINATOR_VALUE) {
            composite.serialized_name = value.to_string();
        }

        if matches!(schema.data_type(), None | Some(DataType::Object)) {
            if let Some(values) = schema.additional_properties_schema() {
                let value = self.build_dictionary_value(values, &id, name)?;
                let mut catch_all = Property::new(
                    ADDITIONAL_PROPERTIES,
                    ModelType::Dictionary {
                        value: Box::new(value),
                        supports_additional_properties: true,
                    },
                );
                catch_all.serialized_name = Some(String::new());
                catch_all.documentation = Some(ADDITIONAL_PROPERTIES_DOC.to_string());
                composite.properties.push(catch_all);
            }
        }

        for (property_name, (property_id, property_schema)) in &expanded.properties {
            if composite.polymorphic_discriminator.as_deref() == Some(*property_name) {
                continue;
            }
            let hint = match property_schema.reference.as_deref() {
                Some(reference) => reference_name(reference).to_string(),
                None => format!("{name}_{property_name}"),
            };
            let property = self.build_property(
                property_name,
                property_schema,
                property_id.clone(),
                &hint,
                expanded.is_required(property_name),
            )?;
            composite.properties.push(property);
        }

        composite.contains_constant_properties = composite.properties.iter().any(|p| {
            p.is_constant
                || p
                    .model_type
                    .as_composite()
                    .is_some_and(|c| self.model.types[c].contains_constant_properties)
        });

        let parent = expanded.parent;
        let mut candidate = name.to_string();
        let result = loop {
            composite.name = candidate.clone();
            match self.generated_types.get(&candidate).copied() {
                None => break local_id,
                Some(existing)
                    if self.model.types[existing].structurally_equals(&composite)
                        && self.extended_types.get(&candidate) == parent.as_ref() =>
                {
                    self.generating_types.insert(id.clone(), existing);
                    break existing;
                }
                Some(_) => candidate.push('_'),
            }
        };
        self.model.types[local_id] = composite;

        if let Some(parent) = parent {
            self.extended_types.insert(candidate.clone(), parent);
        }
        self.generated_types.insert(candidate, result);
        Ok(result)
    }

    pub(crate) fn build_property<'s>(
        &mut self,
        name: &str,
        schema: &'s Schema,
        id: SchemaId,
        type_name: &str,
        required: bool,
    ) -> Result<Property, TransformError>
    where
        'a: 's,
    {
        let model_type = self.build_type(schema, id.clone(), type_name, required)?;
        let (_, target) = self.resolver.unwrap(schema, id)?;
        let facets = schema_facets(target, required);

        let mut property = Property::new(name, model_type);
        property.is_required = required;
        property.is_constant = facets.is_constant;
        property.default_value = facets.default_value;
        property.constraints = facets.constraints;
        property.documentation = schema.description.clone().or(facets.documentation);
        property.summary = schema.title.clone().or_else(|| target.title.clone());
        property.is_read_only = schema.read_only.or(target.read_only).unwrap_or(false);
        property.deprecated = schema.is_deprecated() || target.is_deprecated();
        property.extensions = schema.effective_extensions();

        if property.extensions.flag(X_MS_NO_WIRE) {
            property.serialized_name = None;
        }
        if let Some(forward) = property.extensions.str_value(X_MS_FORWARD_TO) {
            property.forward_to = Some(ForwardTarget::Pending(forward.to_string()));
        }
        Ok(property)
    }
}
