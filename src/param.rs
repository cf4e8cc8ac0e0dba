//! Operation parameters.

use std::fmt;

use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::ComponentError;
use crate::schema::Schema;
use crate::types::{json_type_name, PathSegment, SchemaPath};

/// Where a parameter travels (`in`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Query,
    Path,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(ParamLocation::Query),
            "path" => Some(ParamLocation::Path),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Query => "query",
            ParamLocation::Path => "path",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Param<'a> {
    raw: &'a Map<String, Value>,
    name: &'a str,
    location: ParamLocation,
}

impl<'a> Param<'a> {
    /// # Errors
    ///
    /// `ComponentError::MissingField` without `name` or `in`,
    /// `ComponentError::InvalidField` for an unknown `in` value.
    pub fn new(raw: &'a Value) -> Result<Self, ComponentError> {
        let map = raw.as_object().ok_or_else(|| ComponentError::InvalidField {
            path: "parameters".into(),
            field: "parameter".into(),
            expected: "object".into(),
            actual: json_type_name(raw).into(),
        })?;

        let name = map
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ComponentError::MissingField {
                path: "parameters".into(),
                field: "name".into(),
            })?;

        let path = SchemaPath::new().child(PathSegment::Param(name.to_string()));
        let location = match map.get("in") {
            None => {
                return Err(ComponentError::MissingField {
                    path: path.to_string(),
                    field: "in".into(),
                })
            }
            Some(v) => v
                .as_str()
                .and_then(ParamLocation::parse)
                .ok_or_else(|| ComponentError::InvalidField {
                    path: path.to_string(),
                    field: "in".into(),
                    expected: "query, path, header or cookie".into(),
                    actual: v.to_string(),
                })?,
        };

        Ok(Self {
            raw: map,
            name,
            location,
        })
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn location(&self) -> ParamLocation {
        self.location
    }

    pub fn descr(&self) -> Option<&'a str> {
        self.raw.get("description").and_then(|v| v.as_str())
    }

    /// Explicit `required`, else true for path parameters only.
    pub fn required(&self) -> bool {
        self.raw
            .get("required")
            .and_then(|v| v.as_bool())
            .unwrap_or(self.location == ParamLocation::Path)
    }

    pub fn schema(&self, cx: &Context<'a>) -> Result<Schema<'a>, ComponentError> {
        let path = SchemaPath::new().child(PathSegment::Param(self.name.to_string()));
        Ok(cx.schema_at(self.raw.get("schema"), path)?)
    }
}
