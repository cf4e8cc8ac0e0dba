//! Security schemes and the scopes an operation requires of them.

use serde_json::Value;

use crate::error::ComponentError;

#[derive(Debug, Clone)]
pub struct SecurityScheme<'a> {
    name: String,
    scopes: Vec<String>,
    raw: &'a Value,
}

impl<'a> SecurityScheme<'a> {
    /// # Errors
    ///
    /// `ComponentError::MissingField` for an empty name.
    pub fn new(name: &str, raw: &'a Value, scopes: Vec<String>) -> Result<Self, ComponentError> {
        if name.is_empty() {
            return Err(ComponentError::MissingField {
                path: "securitySchemes".into(),
                field: "name".into(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            scopes,
            raw,
        })
    }

    /// The same scheme with the scopes of a security requirement.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Declared `type` (`apiKey`, `http`, `oauth2`, `openIdConnect`).
    pub fn scheme_type(&self) -> Option<&'a str> {
        self.raw.get("type").and_then(|v| v.as_str())
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }
}
