//! Request bodies.

use serde_json::{Map, Value};

use crate::content::Content;
use crate::context::Context;
use crate::error::ComponentError;
use crate::schema::Schema;
use crate::types::{json_type_name, SchemaPath};

#[derive(Debug, Clone)]
pub struct RequestBody<'a> {
    raw: &'a Map<String, Value>,
    content: Content<'a>,
}

impl<'a> RequestBody<'a> {
    /// # Errors
    ///
    /// `ComponentError::MissingField` without a `content` map, plus the
    /// errors of [`Content::new`].
    pub fn new(raw: &'a Value, path: SchemaPath) -> Result<Self, ComponentError> {
        let map = raw.as_object().ok_or_else(|| ComponentError::InvalidField {
            path: path.to_string(),
            field: "requestBody".into(),
            expected: "object".into(),
            actual: json_type_name(raw).into(),
        })?;
        let content = map
            .get("content")
            .ok_or_else(|| ComponentError::MissingField {
                path: path.to_string(),
                field: "content".into(),
            })?;

        Ok(Self {
            raw: map,
            content: Content::new(content, path)?,
        })
    }

    pub fn content_types(&self) -> Vec<&'a str> {
        self.content.content_types()
    }

    pub fn schema(
        &self,
        cx: &Context<'a>,
        content_type: &str,
    ) -> Result<Option<Schema<'a>>, ComponentError> {
        self.content.schema(cx, content_type)
    }

    pub fn content(&self) -> &Content<'a> {
        &self.content
    }

    pub fn descr(&self) -> Option<&'a str> {
        self.raw.get("description").and_then(|v| v.as_str())
    }

    pub fn required(&self) -> bool {
        self.raw
            .get("required")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
