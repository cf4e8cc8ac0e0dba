//! Media-type maps (`content`) of request bodies and responses.

use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::ComponentError;
use crate::schema::Schema;
use crate::types::{json_type_name, PathSegment, SchemaPath};

/// A non-empty `content` map keyed by content type.
#[derive(Debug, Clone)]
pub struct Content<'a> {
    raw: &'a Map<String, Value>,
    path: SchemaPath,
}

impl<'a> Content<'a> {
    /// # Errors
    ///
    /// `ComponentError::InvalidField` if `raw` is not an object,
    /// `ComponentError::EmptyContent` if it declares no content type.
    pub fn new(raw: &'a Value, path: SchemaPath) -> Result<Self, ComponentError> {
        let map = raw.as_object().ok_or_else(|| ComponentError::InvalidField {
            path: path.to_string(),
            field: "content".into(),
            expected: "object".into(),
            actual: json_type_name(raw).into(),
        })?;

        if map.is_empty() {
            return Err(ComponentError::EmptyContent {
                path: path.to_string(),
            });
        }

        Ok(Self { raw: map, path })
    }

    pub fn content_types(&self) -> Vec<&'a str> {
        self.raw.keys().map(String::as_str).collect()
    }

    /// Schema declared for `content_type`.
    ///
    /// `None` if the content type is not declared or declares no schema.
    pub fn schema(
        &self,
        cx: &Context<'a>,
        content_type: &str,
    ) -> Result<Option<Schema<'a>>, ComponentError> {
        let Some(media) = self.raw.get(content_type) else {
            return Ok(None);
        };
        let Some(raw) = media.get("schema") else {
            return Ok(None);
        };

        let path = self
            .path
            .child(PathSegment::Content(content_type.to_string()));
        Ok(Some(cx.schema_at(Some(raw), path)?))
    }
}
