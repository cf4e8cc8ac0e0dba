//! Error types for OpenAPI document access and schema interpretation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or validating the top-level document.
#[derive(Debug, Error)]
pub enum DocumentError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("not an OpenAPI specification: missing openapi version field")]
    NotOpenApi,

    #[error("only OpenAPI version 3 is supported, got \"{version}\"")]
    UnsupportedVersion { version: String },

    #[error("OpenAPI specification validation failed, {message}")]
    InvalidServers { message: String },
}

impl DocumentError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DocumentError::FileNotFound { .. } | DocumentError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors in `$ref` strings.
///
/// A syntactically valid reference to a supported component kind that names
/// nothing is not an error; resolution yields `None` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefError {
    #[error("malformed ref \"{reference}\": expected #/components/<kind>/<name>")]
    Malformed { reference: String },

    #[error("component type \"{kind}\" not supported")]
    UnsupportedComponent { kind: String },

    #[error("component type \"{kind}\" is invalid")]
    InvalidComponent { kind: String },

    #[error("cyclic reference: {}", chain.join(" -> "))]
    Cyclic { chain: Vec<String> },
}

/// Errors while building schema nodes and property facets.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no schema definition at {path}")]
    MissingDefinition { path: String },

    #[error("invalid schema definition at {path}: expected object, got {actual}")]
    InvalidDefinition { path: String, actual: String },

    #[error("invalid type \"{value}\" at {path}: expected object, array, string, number, integer or boolean")]
    InvalidType { path: String, value: String },

    #[error("property name missing at {path}")]
    MissingName { path: String },

    #[error("cannot call of() on non array schema at {path}")]
    NotAnArray { path: String },

    #[error("array schema without items at {path}")]
    MissingItems { path: String },

    #[error("unresolved ref \"{reference}\" at {path}")]
    UnresolvedRef { path: String, reference: String },

    #[error("ref \"{reference}\" at {path} does not name a schema")]
    NotASchema { path: String, reference: String },

    #[error(transparent)]
    Ref(#[from] RefError),
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors from the component wrappers (operations, parameters, responses, bodies).
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("content is empty at {path}, expected content type")]
    EmptyContent { path: String },

    #[error("missing {field} at {path}")]
    MissingField { path: String, field: String },

    #[error("invalid {field} at {path}: expected {expected}, got {actual}")]
    InvalidField {
        path: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("unknown security scheme \"{name}\"")]
    UnknownSecurityScheme { name: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Ref(#[from] RefError),
}

impl ComponentError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ComponentError::Schema(e) => e.exit_code(),
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_error_exit_codes() {
        let err = DocumentError::FileNotFound {
            path: PathBuf::from("api.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = DocumentError::UnsupportedVersion {
            version: "2.0".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn component_error_wraps_schema_error() {
        let err: ComponentError = SchemaError::MissingItems {
            path: "schema:Tags".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "array schema without items at schema:Tags");
    }

    #[test]
    fn cyclic_ref_display() {
        let err = RefError::Cyclic {
            chain: vec![
                "#/components/schemas/A".into(),
                "#/components/schemas/B".into(),
                "#/components/schemas/A".into(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "cyclic reference: #/components/schemas/A -> #/components/schemas/B -> #/components/schemas/A"
        );
    }
}
