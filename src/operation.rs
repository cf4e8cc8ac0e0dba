//! Operations and outbound request assembly.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::{component_ref, parse_ref, ref_of, Component, Context};
use crate::error::ComponentError;
use crate::param::{Param, ParamLocation};
use crate::reqbody::RequestBody;
use crate::response::Response;
use crate::secscheme::SecurityScheme;
use crate::types::{json_type_name, ComponentKind, PathSegment, SchemaPath};

/// Characters `encodeURIComponent` leaves alone, besides alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// An assembled, unsent HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub method: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// One method on one path.
#[derive(Debug, Clone)]
pub struct Operation<'a> {
    path: &'a str,
    method: &'a str,
    raw: &'a Map<String, Value>,
}

impl<'a> Operation<'a> {
    /// # Errors
    ///
    /// `ComponentError::MissingField` for an empty path or method,
    /// `ComponentError::InvalidField` if the definition is not an object.
    pub fn new(path: &'a str, method: &'a str, raw: &'a Value) -> Result<Self, ComponentError> {
        if path.is_empty() {
            return Err(ComponentError::MissingField {
                path: "paths".into(),
                field: "path".into(),
            });
        }
        if method.is_empty() {
            return Err(ComponentError::MissingField {
                path: format!("paths/{}", path),
                field: "method".into(),
            });
        }
        let map = raw.as_object().ok_or_else(|| ComponentError::InvalidField {
            path: format!("paths/{}/{}", path, method),
            field: "operation".into(),
            expected: "object".into(),
            actual: json_type_name(raw).into(),
        })?;

        Ok(Self {
            path,
            method,
            raw: map,
        })
    }

    /// Path template without its leading slash.
    pub fn path(&self) -> &'a str {
        self.path.strip_prefix('/').unwrap_or(self.path)
    }

    /// Upper-cased HTTP method.
    pub fn method(&self) -> String {
        self.method.to_uppercase()
    }

    pub fn id(&self) -> Option<&'a str> {
        self.raw.get("operationId").and_then(|v| v.as_str())
    }

    pub fn summary(&self) -> Option<&'a str> {
        self.raw.get("summary").and_then(|v| v.as_str())
    }

    pub fn tags(&self) -> Vec<&'a str> {
        self.raw
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    /// Declared parameters.
    ///
    /// # Errors
    ///
    /// Parameter references are rejected: `#/components/parameters` is not a
    /// supported component kind, and no supported kind is a parameter.
    pub fn params(&self) -> Result<Vec<Param<'a>>, ComponentError> {
        let Some(params) = self.raw.get("parameters").and_then(|v| v.as_array()) else {
            return Ok(Vec::new());
        };

        params
            .iter()
            .map(|raw| match ref_of(raw) {
                Some(reference) => {
                    parse_ref(reference)?;
                    Err(ComponentError::InvalidField {
                        path: self.diagnostic_path().to_string(),
                        field: "parameters".into(),
                        expected: "parameter".into(),
                        actual: reference.to_string(),
                    })
                }
                None => Param::new(raw),
            })
            .collect()
    }

    /// Responses in declaration order.
    pub fn responses(&self) -> Result<Vec<Response<'a>>, ComponentError> {
        let Some(responses) = self.raw.get("responses").and_then(|v| v.as_object()) else {
            return Ok(Vec::new());
        };
        responses
            .iter()
            .map(|(status, raw)| Response::new(status, raw))
            .collect()
    }

    /// Security requirements, one scheme per requirement object.
    ///
    /// Empty requirement objects (anonymous access) are skipped.
    ///
    /// # Errors
    ///
    /// `ComponentError::UnknownSecurityScheme` if a requirement names a
    /// scheme absent from `components.securitySchemes`.
    pub fn security(&self, cx: &Context<'a>) -> Result<Vec<SecurityScheme<'a>>, ComponentError> {
        let Some(requirements) = self.raw.get("security").and_then(|v| v.as_array()) else {
            return Ok(Vec::new());
        };

        let mut schemes = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            let Some((name, scopes)) = requirement.as_object().and_then(|r| r.iter().next())
            else {
                continue;
            };
            let scopes: Vec<String> = scopes
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();

            let reference = component_ref(ComponentKind::SecuritySchemes, name);
            let scheme = cx
                .resolve_ref(&reference)?
                .and_then(Component::into_security_scheme)
                .ok_or_else(|| ComponentError::UnknownSecurityScheme { name: name.clone() })?;
            schemes.push(scheme.with_scopes(scopes));
        }
        Ok(schemes)
    }

    /// Inline or referenced request body; `None` when there is none.
    ///
    /// A reference that names nothing is reported as a warning and treated
    /// as absent.
    pub fn req_body(&self, cx: &Context<'a>) -> Result<Option<RequestBody<'a>>, ComponentError> {
        let Some(raw) = self.raw.get("requestBody") else {
            return Ok(None);
        };

        match ref_of(raw) {
            Some(reference) => {
                let body = cx
                    .resolve_ref(reference)?
                    .and_then(Component::into_request_body);
                if body.is_none() {
                    cx.logger().warn(&format!(
                        "{}: request body ref \"{}\" resolves to nothing",
                        self.diagnostic_path(),
                        reference
                    ));
                }
                Ok(body)
            }
            None => RequestBody::new(raw, self.diagnostic_path()).map(Some),
        }
    }

    /// Assemble the request for this operation against `server`.
    ///
    /// Query parameters are appended and path parameters substituted for
    /// every declared parameter with a non-null value in `values`, encoded
    /// like `encodeURIComponent`. The body is encoded only when both a
    /// content type and a body are given.
    pub fn request(
        &self,
        cx: &Context<'a>,
        server: &str,
        values: &Map<String, Value>,
        content_type: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Request, ComponentError> {
        let mut url = format!("{}/{}", server.trim_end_matches('/'), self.path());

        let mut query = Vec::new();
        for param in self.params()? {
            let Some(value) = values.get(param.name()).filter(|v| !v.is_null()) else {
                continue;
            };
            let encoded = utf8_percent_encode(&param_text(value), URI_COMPONENT).to_string();
            match param.location() {
                ParamLocation::Query => query.push(format!("{}={}", param.name(), encoded)),
                ParamLocation::Path => {
                    url = url.replace(&format!("{{{}}}", param.name()), &encoded);
                }
                ParamLocation::Header | ParamLocation::Cookie => {}
            }
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        let encoded_body = match (content_type, body) {
            (Some(ct), Some(body)) => self.encode_body(cx, ct, body),
            _ => None,
        };

        Ok(Request {
            method: self.method(),
            url,
            body: encoded_body,
            content_type: content_type.map(String::from),
        })
    }

    fn encode_body(&self, cx: &Context<'a>, content_type: &str, body: &Value) -> Option<String> {
        match content_type {
            "application/json" => Some(body.to_string()),
            "text/plain" | "plain/text" | "application/octet-stream" => Some(param_text(body)),
            other => {
                cx.logger().warn(&format!(
                    "{}: cannot encode body for content type \"{}\", sending none",
                    self.diagnostic_path(),
                    other
                ));
                None
            }
        }
    }

    fn diagnostic_path(&self) -> SchemaPath {
        let label = self
            .id()
            .map(String::from)
            .unwrap_or_else(|| format!("{} {}", self.method(), self.path));
        SchemaPath::new().child(PathSegment::Operation(label))
    }
}

// Strings verbatim, everything else as JSON text.
fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
