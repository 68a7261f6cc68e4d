pub mod collection_format;
pub mod context;
pub mod operation_builder;
pub mod parameter_builder;
pub mod primitive_builder;
pub mod response_builder;
pub mod spec_to_model;
pub mod type_builder;

pub use spec_to_model::{transform, transform_with_options};

/// Knobs the caller controls when building a model.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub namespace: String,
    pub models_name: Option<String>,
    /// Used as the model name when the document has no title.
    pub client_name: Option<String>,
    /// Accept types whose ancestor chain declares no property at all, and
    /// emit property-less object schemas as empty composites.
    pub generate_empty_classes: bool,
    pub legacy_collection_format: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            models_name: None,
            client_name: None,
            generate_empty_classes: false,
            legacy_collection_format: true,
        }
    }
}
