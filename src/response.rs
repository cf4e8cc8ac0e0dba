//! Operation responses.

use serde_json::{Map, Value};

use crate::content::Content;
use crate::error::ComponentError;
use crate::types::{json_type_name, SchemaPath};

#[derive(Debug, Clone)]
pub struct Response<'a> {
    key: &'a str,
    raw: &'a Map<String, Value>,
}

impl<'a> Response<'a> {
    /// `key` is the status key of the `responses` map (`"200"`, `"4XX"`,
    /// `"default"`).
    pub fn new(key: &'a str, raw: &'a Value) -> Result<Self, ComponentError> {
        if key.is_empty() {
            return Err(ComponentError::MissingField {
                path: "responses".into(),
                field: "status".into(),
            });
        }
        let map = raw.as_object().ok_or_else(|| ComponentError::InvalidField {
            path: format!("responses/{}", key),
            field: "response".into(),
            expected: "object".into(),
            actual: json_type_name(raw).into(),
        })?;
        Ok(Self { key, raw: map })
    }

    /// Status key as written in the document.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Numeric status; `None` for `default` and range keys like `4XX`.
    pub fn status(&self) -> Option<u16> {
        self.key.parse().ok()
    }

    pub fn descr(&self) -> Option<&'a str> {
        self.raw.get("description").and_then(|v| v.as_str())
    }

    pub fn content(&self) -> Result<Option<Content<'a>>, ComponentError> {
        self.raw
            .get("content")
            .map(|c| Content::new(c, SchemaPath::new()))
            .transpose()
    }

    pub fn success(&self) -> bool {
        self.class() == Some(2)
    }

    pub fn redirection(&self) -> bool {
        self.class() == Some(3)
    }

    pub fn failure(&self) -> bool {
        matches!(self.class(), Some(4 | 5))
    }

    // Hundreds digit of an exact status or a range key.
    fn class(&self) -> Option<u16> {
        if let Some(status) = self.status() {
            return Some(status / 100);
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.as_str()) {
            (Some(d), "XX" | "xx") => d.to_digit(10).map(|d| d as u16),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_classes() {
        let raw = json!({});
        let ok = Response::new("200", &raw).unwrap();
        assert_eq!(ok.status(), Some(200));
        assert!(ok.success() && !ok.failure() && !ok.redirection());

        let moved = Response::new("301", &raw).unwrap();
        assert!(moved.redirection());

        let missing = Response::new("404", &raw).unwrap();
        assert!(missing.failure());

        let broken = Response::new("503", &raw).unwrap();
        assert!(broken.failure());
    }

    #[test]
    fn default_and_range_keys() {
        let raw = json!({});
        let default = Response::new("default", &raw).unwrap();
        assert_eq!(default.status(), None);
        assert!(!default.success() && !default.failure() && !default.redirection());

        let client = Response::new("4XX", &raw).unwrap();
        assert_eq!(client.status(), None);
        assert!(client.failure());
    }

    #[test]
    fn content_is_optional() {
        let raw = json!({ "description": "gone" });
        let response = Response::new("410", &raw).unwrap();
        assert_eq!(response.descr(), Some("gone"));
        assert!(response.content().unwrap().is_none());

        let raw = json!({ "content": { "application/json": { "schema": { "type": "object" } } } });
        let response = Response::new("200", &raw).unwrap();
        let content = response.content().unwrap().unwrap();
        assert_eq!(content.content_types(), ["application/json"]);
    }

    #[test]
    fn empty_content_errors() {
        let raw = json!({ "content": {} });
        let response = Response::new("200", &raw).unwrap();
        assert!(matches!(
            response.content(),
            Err(ComponentError::EmptyContent { .. })
        ));
    }
}
