use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::transform::TransformOptions;

/// Project configuration loaded from `.oam.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelerConfig {
    pub input: String,
    /// Namespace copied verbatim into the model.
    pub namespace: String,
    /// Namespace of the generated model types, if different.
    pub models_name: Option<String>,
    /// Client name used when the document has no title.
    pub client_name: Option<String>,
    /// Allow schemas whose whole ancestor chain declares no property.
    pub generate_empty_classes: bool,
    /// Reproduce the historical collection-format fallback: an unset
    /// style/explode pair yields no collection format and explode defaults
    /// to false.
    pub legacy_collection_format: bool,
}

impl Default for ModelerConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            namespace: String::new(),
            models_name: None,
            client_name: None,
            generate_empty_classes: false,
            legacy_collection_format: true,
        }
    }
}

impl ModelerConfig {
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            namespace: self.namespace.clone(),
            models_name: self.models_name.clone(),
            client_name: self.client_name.clone(),
            generate_empty_classes: self.generate_empty_classes,
            legacy_collection_format: self.legacy_collection_format,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oam.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ModelerConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ModelerConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oam configuration
input: openapi.yaml
namespace: ""
# models_name: Models
# client_name: MyClient            # used when info.title is missing

generate_empty_classes: false      # allow types whose ancestors declare no properties
legacy_collection_format: true     # unset style/explode on a parameter means no collection format
"#
}
