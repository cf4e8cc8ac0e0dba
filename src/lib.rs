//! OpenAPI v3 document object model.
//!
//! Wraps an already-parsed OpenAPI description in typed accessors that
//! resolve `#/components/...` references, classify schema shapes, and
//! interpret raw JSON payloads against declared schemas.
//!
//! # Example
//!
//! ```
//! use oasa::{Document, DocumentOptions};
//! use serde_json::json;
//!
//! let doc = Document::new(
//!     json!({
//!         "openapi": "3.0.0",
//!         "components": {
//!             "schemas": {
//!                 "Pet": {
//!                     "type": "object",
//!                     "properties": {
//!                         "id": { "type": "integer" },
//!                         "name": { "type": "string" }
//!                     }
//!                 }
//!             }
//!         }
//!     }),
//!     DocumentOptions::new(),
//! )
//! .unwrap();
//!
//! let cx = doc.context();
//! let pet = doc.schema("Pet").unwrap().unwrap();
//! let data = json!({ "id": 0, "name": "Rex", "owner": "dropped" });
//! let interpreted = pet.interpret(&cx, &data).unwrap().unwrap();
//!
//! // Unknown properties are narrowed away, falsy values are kept
//! assert_eq!(interpreted.serialise(), json!({ "id": 0, "name": "Rex" }));
//! ```
//!
//! # Interpretation Rules
//!
//! | Schema type | Data | Result |
//! |-------------|------|--------|
//! | any | `null` | `null` |
//! | `object` | object | interpreted object |
//! | `array` | array | elements interpreted through `items` |
//! | `array` | not an array | warning, `None` |
//! | scalar or untyped | anything | unchanged |

mod content;
mod context;
mod document;
mod error;
mod loader;
mod logger;
mod object;
mod operation;
mod param;
mod reqbody;
mod response;
mod schema;
mod secscheme;
mod types;

pub use content::Content;
pub use context::{component_ref, parse_ref, Component, Context, RefTarget, RefTrail};
pub use document::{Document, DocumentOptions};
pub use error::{ComponentError, DocumentError, RefError, SchemaError};
pub use loader::{load_document, load_json, load_json_str};
pub use logger::{Level, Logger};
pub use object::{Interpreted, Object};
pub use operation::{Operation, Request};
pub use param::{Param, ParamLocation};
pub use reqbody::RequestBody;
pub use response::Response;
pub use schema::{Property, Schema, WILDCARD_NAME};
pub use secscheme::SecurityScheme;
pub use types::{
    ComponentKind, PathSegment, SchemaPath, SchemaType, HTTP_METHODS, SUPPORTED_COMPONENTS,
    UNSUPPORTED_COMPONENTS,
};
