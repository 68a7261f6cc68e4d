use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::{Extensions, X_MS_REQUEST_BODY_INDEX, X_MS_REQUEST_BODY_NAME};
use super::media_type::MediaType;
use super::schema::Schema;

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl RequestBody {
    /// Schema of the first content entry.
    pub fn schema(&self) -> Option<&Schema> {
        self.content.values().next().and_then(|m| m.schema.as_ref())
    }

    /// True when the only content entry is `multipart/form-data`.
    pub fn is_form_data(&self) -> bool {
        self.content.len() == 1
            && self
                .content
                .keys()
                .all(|k| k.eq_ignore_ascii_case("multipart/form-data"))
    }

    /// Name of the synthetic body parameter.
    pub fn parameter_name(&self) -> &str {
        self.extensions
            .str_value(X_MS_REQUEST_BODY_NAME)
            .unwrap_or("body")
    }

    /// Requested position of the body parameter in the parameter list.
    pub fn parameter_index(&self) -> Option<usize> {
        let value = self.extensions.get(X_MS_REQUEST_BODY_INDEX)?;
        match value {
            serde_json::Value::Number(n) => n.as_u64().map(|n| n as usize),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// A reference or inline request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}
