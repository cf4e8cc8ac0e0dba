//! Core types shared by the schema and document wrappers.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Component kinds that `$ref` resolution understands.
pub const SUPPORTED_COMPONENTS: &[&str] = &["schemas", "requestBodies", "securitySchemes"];

/// OpenAPI component kinds that exist but are rejected at resolution time.
pub const UNSUPPORTED_COMPONENTS: &[&str] = &[
    "parameters",
    "responses",
    "headers",
    "examples",
    "links",
    "callbacks",
];

/// Path item keys that denote operations.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The definition used for `additionalProperties: true`.
pub(crate) fn empty_schema() -> &'static Value {
    static EMPTY: OnceLock<Value> = OnceLock::new();
    EMPTY.get_or_init(|| Value::Object(Map::new()))
}

/// Classified shape of a schema fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    /// No `type` declared.
    Any,
}

impl SchemaType {
    /// Parse a declared `type` value.
    ///
    /// Returns `None` for values outside the allowed set; `"any"` is not a
    /// valid declaration, it is only what an omitted `type` classifies as.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(SchemaType::Object),
            "array" => Some(SchemaType::Array),
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Any => "any",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported `#/components/<kind>` sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Schemas,
    RequestBodies,
    SecuritySchemes,
}

impl ComponentKind {
    /// Parse a supported component kind. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "schemas" => Some(ComponentKind::Schemas),
            "requestBodies" => Some(ComponentKind::RequestBodies),
            "securitySchemes" => Some(ComponentKind::SecuritySchemes),
            _ => None,
        }
    }

    /// Key of this section under `components`.
    pub fn section(&self) -> &'static str {
        match self {
            ComponentKind::Schemas => "schemas",
            ComponentKind::RequestBodies => "requestBodies",
            ComponentKind::SecuritySchemes => "securitySchemes",
        }
    }
}

/// One navigation step in a diagnostic path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named component schema.
    Schema(String),
    /// A property, declared or matched by `additionalProperties`.
    Prop(String),
    /// Array item descent.
    Items,
    Param(String),
    Content(String),
    Operation(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Schema(name) => write!(f, "schema:{}", name),
            PathSegment::Prop(name) => write!(f, "prop:{}", name),
            PathSegment::Items => f.write_str("[]"),
            PathSegment::Param(name) => write!(f, "param:{}", name),
            PathSegment::Content(ct) => write!(f, "content:{}", ct),
            PathSegment::Operation(id) => write!(f, "op:{}", id),
        }
    }
}

/// Breadcrumb of navigation steps, used only in log and error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPath(Vec<PathSegment>);

impl SchemaPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path rooted at a named component schema.
    pub fn named(name: &str) -> Self {
        Self(vec![PathSegment::Schema(name.to_string())])
    }

    /// A copy of this path with one more segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
