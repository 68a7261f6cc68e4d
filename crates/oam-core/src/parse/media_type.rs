use serde::{Deserialize, Serialize};

use super::extensions::Extensions;
use super::schema::Schema;

/// A media type entry of a request body or response `content` map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(flatten)]
    pub extensions: Extensions,
}
