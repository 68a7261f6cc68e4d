use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const X_MS_ENUM: &str = "x-ms-enum";
pub const X_MS_HEADERS: &str = "x-ms-headers";
pub const X_MS_HEADER_COLLECTION_PREFIX: &str = "x-ms-header-collection-prefix";
pub const X_MS_ERROR_RESPONSE: &str = "x-ms-error-response";
pub const X_MS_NO_WIRE: &str = "x-ms-no-wire";
pub const X_MS_FORWARD_TO: &str = "x-ms-forward-to";
pub const X_MS_DISCRIMINATOR_VALUE: &str = "x-ms-discriminator-value";
pub const X_MS_PARAMETERIZED_HOST: &str = "x-ms-parameterized-host";
pub const X_MS_REQUEST_BODY_NAME: &str = "x-ms-requestBody-name";
pub const X_MS_REQUEST_BODY_INDEX: &str = "x-ms-requestBody-index";
pub const X_NULLABLE: &str = "x-nullable";
pub const X_DEPRECATED: &str = "x-deprecated";

/// Vendor extension bag. Only keys starting with `x-` are kept when a node is
/// deserialized; everything else the document model does not name is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Extensions(IndexMap<String, Value>);

impl<'de> Deserialize<'de> for Extensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter(|(key, _)| key.starts_with("x-"))
                .collect(),
        ))
    }
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A boolean flag, tolerating the `"true"` string form some documents use.
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Extensions {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_vendor_keys() {
        let ext: Extensions =
            serde_json::from_str(r#"{"x-ms-enum": {"name": "Color"}, "oneOf": []}"#).unwrap();
        assert_eq!(ext.len(), 1);
        assert!(ext.contains(X_MS_ENUM));
    }

    #[test]
    fn flag_accepts_string_form() {
        let ext: Extensions =
            serde_json::from_str(r#"{"x-ms-no-wire": "True", "x-ms-error-response": true}"#)
                .unwrap();
        assert!(ext.flag(X_MS_NO_WIRE));
        assert!(ext.flag(X_MS_ERROR_RESPONSE));
        assert!(!ext.flag(X_MS_FORWARD_TO));
    }
}
