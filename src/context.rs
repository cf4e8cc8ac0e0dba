//! Resolution context and `$ref` handling.
//!
//! Every wrapper construction and interpretation call receives a [`Context`]
//! explicitly. It carries the document root, used to look up
//! `#/components/...` entries, and the diagnostic sink.

use serde_json::Value;

use crate::error::{ComponentError, RefError, SchemaError};
use crate::logger::Logger;
use crate::reqbody::RequestBody;
use crate::schema::Schema;
use crate::secscheme::SecurityScheme;
use crate::types::{ComponentKind, SchemaPath, UNSUPPORTED_COMPONENTS};

/// A wrapper built from a resolved `#/components/...` entry.
#[derive(Debug, Clone)]
pub enum Component<'a> {
    Schema(Schema<'a>),
    RequestBody(RequestBody<'a>),
    SecurityScheme(SecurityScheme<'a>),
}

impl<'a> Component<'a> {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Schema(_) => ComponentKind::Schemas,
            Component::RequestBody(_) => ComponentKind::RequestBodies,
            Component::SecurityScheme(_) => ComponentKind::SecuritySchemes,
        }
    }

    pub fn into_schema(self) -> Option<Schema<'a>> {
        match self {
            Component::Schema(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn into_request_body(self) -> Option<RequestBody<'a>> {
        match self {
            Component::RequestBody(body) => Some(body),
            _ => None,
        }
    }

    pub fn into_security_scheme(self) -> Option<SecurityScheme<'a>> {
        match self {
            Component::SecurityScheme(scheme) => Some(scheme),
            _ => None,
        }
    }
}

/// A parsed `#/components/<kind>/<name>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    pub kind: ComponentKind,
    pub name: String,
}

/// Parse a component reference.
///
/// # Errors
///
/// `RefError::Malformed` if the string is not `#/components/<kind>/<name>`,
/// `RefError::UnsupportedComponent` for OpenAPI component kinds this crate
/// does not wrap, `RefError::InvalidComponent` for any other kind.
pub fn parse_ref(reference: &str) -> Result<RefTarget, RefError> {
    let malformed = || RefError::Malformed {
        reference: reference.to_string(),
    };

    let rest = reference
        .strip_prefix("#/components/")
        .ok_or_else(malformed)?;
    let (kind, name) = rest.split_once('/').ok_or_else(malformed)?;

    if kind.is_empty()
        || name.is_empty()
        || name.contains('/')
        || reference.chars().any(char::is_whitespace)
    {
        return Err(malformed());
    }

    if UNSUPPORTED_COMPONENTS.contains(&kind) {
        return Err(RefError::UnsupportedComponent {
            kind: kind.to_string(),
        });
    }

    let kind = ComponentKind::parse(kind).ok_or_else(|| RefError::InvalidComponent {
        kind: kind.to_string(),
    })?;

    Ok(RefTarget {
        kind,
        name: unescape_pointer(name),
    })
}

/// Build the reference string for a named component.
pub fn component_ref(kind: ComponentKind, name: &str) -> String {
    format!("#/components/{}/{}", kind.section(), escape_pointer(name))
}

/// Unescape JSON Pointer encoding (~1 = /, ~0 = ~).
fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Returns the `$ref` string of a fragment, if it is a reference object.
pub(crate) fn ref_of(raw: &Value) -> Option<&str> {
    raw.get("$ref").and_then(|r| r.as_str())
}

/// References entered while following an alias chain.
///
/// A component whose definition is itself `{"$ref": ...}` is followed to its
/// target; revisiting a key on the same chain is a cycle.
#[derive(Debug, Default)]
pub struct RefTrail {
    entered: Vec<String>,
}

impl RefTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `reference` as in progress.
    ///
    /// # Errors
    ///
    /// Returns `RefError::Cyclic` if it is already on the trail.
    pub fn enter(&mut self, reference: &str) -> Result<(), RefError> {
        if self.entered.iter().any(|r| r == reference) {
            let mut chain = self.entered.clone();
            chain.push(reference.to_string());
            return Err(RefError::Cyclic { chain });
        }
        self.entered.push(reference.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entered.is_empty()
    }
}

/// Explicit context for construction and interpretation.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    root: &'a Value,
    logger: &'a Logger,
}

impl<'a> Context<'a> {
    /// Create a context over a raw document tree.
    pub fn new(root: &'a Value, logger: &'a Logger) -> Self {
        Self { root, logger }
    }

    pub fn logger(&self) -> &'a Logger {
        self.logger
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Resolve a `#/components/<kind>/<name>` reference to a wrapper.
    ///
    /// Returns `Ok(None)` when the reference is well formed but the document
    /// has no such entry.
    ///
    /// # Errors
    ///
    /// `RefError` for malformed or unsupported references and alias cycles;
    /// construction errors of the resolved wrapper.
    pub fn resolve_ref(&self, reference: &str) -> Result<Option<Component<'a>>, ComponentError> {
        let Some((target, raw)) = self.follow(reference)? else {
            return Ok(None);
        };

        let component = match target.kind {
            ComponentKind::Schemas => Component::Schema(Schema::named(raw, &target.name)?),
            ComponentKind::RequestBodies => Component::RequestBody(RequestBody::new(
                raw,
                SchemaPath::new(),
            )?),
            ComponentKind::SecuritySchemes => {
                Component::SecurityScheme(SecurityScheme::new(&target.name, raw, Vec::new())?)
            }
        };
        Ok(Some(component))
    }

    /// Resolve a reference that must name a schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::NotASchema` if the reference resolves to another kind of
    /// component, plus the errors of [`Context::resolve_ref`].
    pub fn resolve_schema_ref(&self, reference: &str) -> Result<Option<Schema<'a>>, SchemaError> {
        let Some((target, raw)) = self.follow(reference)? else {
            return Ok(None);
        };

        if target.kind != ComponentKind::Schemas {
            return Err(SchemaError::NotASchema {
                path: component_ref(target.kind, &target.name),
                reference: reference.to_string(),
            });
        }

        Schema::named(raw, &target.name).map(Some)
    }

    /// Build a schema node from an inline fragment or a `$ref` to one.
    ///
    /// A resolved reference is rebased under `path` so diagnostics keep the
    /// navigation breadcrumb.
    pub(crate) fn schema_at(
        &self,
        raw: Option<&'a Value>,
        path: SchemaPath,
    ) -> Result<Schema<'a>, SchemaError> {
        let Some(raw) = raw else {
            return Err(SchemaError::MissingDefinition {
                path: path.to_string(),
            });
        };

        match ref_of(raw) {
            Some(reference) => {
                let schema = self.resolve_schema_ref(reference)?.ok_or_else(|| {
                    SchemaError::UnresolvedRef {
                        path: path.to_string(),
                        reference: reference.to_string(),
                    }
                })?;
                Ok(schema.rebased(&path))
            }
            None => Schema::new(raw, path),
        }
    }

    /// Follow a reference, and any alias chain behind it, to a raw entry.
    fn follow(&self, reference: &str) -> Result<Option<(RefTarget, &'a Value)>, RefError> {
        let mut trail = RefTrail::new();
        let mut current = reference.to_string();

        loop {
            let target = parse_ref(&current)?;
            trail.enter(&current)?;

            let Some(raw) = self.lookup(target.kind, &target.name) else {
                tracing::trace!(reference = %current, "ref resolves to nothing");
                return Ok(None);
            };

            match ref_of(raw) {
                Some(next) => current = next.to_string(),
                None => {
                    tracing::trace!(reference, hops = trail.len(), "ref resolved");
                    return Ok(Some((target, raw)));
                }
            }
        }
    }

    fn lookup(&self, kind: ComponentKind, name: &str) -> Option<&'a Value> {
        self.root
            .get("components")?
            .get(kind.section())?
            .get(name)
            .filter(|v| !v.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_ref_valid() {
        let target = parse_ref("#/components/schemas/Widget").unwrap();
        assert_eq!(target.kind, ComponentKind::Schemas);
        assert_eq!(target.name, "Widget");

        let target = parse_ref("#/components/requestBodies/NewWidget").unwrap();
        assert_eq!(target.kind, ComponentKind::RequestBodies);

        let target = parse_ref("#/components/securitySchemes/oauth").unwrap();
        assert_eq!(target.kind, ComponentKind::SecuritySchemes);
    }

    #[test]
    fn parse_ref_unescapes_name() {
        let target = parse_ref("#/components/schemas/a~1b~0c").unwrap();
        assert_eq!(target.name, "a/b~c");
        assert_eq!(
            component_ref(ComponentKind::Schemas, "a/b~c"),
            "#/components/schemas/a~1b~0c"
        );
    }

    #[test]
    fn parse_ref_malformed() {
        for bogus in [
            "",
            "#",
            "#/",
            "#/bad",
            "#/components/",
            "#/components/bad/",
            "#/components/schemas",
            "#/components/schemas/",
            "#/components/bad",
            "#/components/securitySchemes/",
            "#/components/schemas/a/b",
            "#/components/schemas/has space",
            "other.json#/components/schemas/Widget",
        ] {
            assert!(
                matches!(parse_ref(bogus), Err(RefError::Malformed { .. })),
                "ref {:?} was accepted",
                bogus
            );
        }
    }

    #[test]
    fn parse_ref_unsupported_kinds() {
        for kind in UNSUPPORTED_COMPONENTS {
            let reference = format!("#/components/{}/something", kind);
            assert!(matches!(
                parse_ref(&reference),
                Err(RefError::UnsupportedComponent { kind: k }) if k == *kind
            ));
        }
    }

    #[test]
    fn parse_ref_invalid_kind() {
        assert!(matches!(
            parse_ref("#/components/invalid/something"),
            Err(RefError::InvalidComponent { kind }) if kind == "invalid"
        ));
    }

    #[test]
    fn ref_trail_detects_revisit() {
        let mut trail = RefTrail::new();
        trail.enter("#/components/schemas/A").unwrap();
        trail.enter("#/components/schemas/B").unwrap();
        let err = trail.enter("#/components/schemas/A").unwrap_err();
        assert!(matches!(err, RefError::Cyclic { chain } if chain.len() == 3));
    }

    #[test]
    fn resolve_ref_missing_sections_are_none() {
        let logger = Logger::Disabled;

        let root = json!({ "openapi": "3.0.0" });
        let cx = Context::new(&root, &logger);
        assert!(cx.resolve_ref("#/components/schemas/Widget").unwrap().is_none());

        let root = json!({ "openapi": "3.0.0", "components": {} });
        let cx = Context::new(&root, &logger);
        assert!(cx.resolve_ref("#/components/schemas/Widget").unwrap().is_none());

        let root = json!({ "openapi": "3.0.0", "components": { "schemas": {} } });
        let cx = Context::new(&root, &logger);
        assert!(cx.resolve_ref("#/components/schemas/Widget").unwrap().is_none());
    }

    #[test]
    fn resolve_ref_follows_alias_chain() {
        let logger = Logger::Disabled;
        let root = json!({
            "components": {
                "schemas": {
                    "Alias": { "$ref": "#/components/schemas/Widget" },
                    "Widget": { "type": "object" }
                }
            }
        });
        let cx = Context::new(&root, &logger);

        let schema = cx
            .resolve_schema_ref("#/components/schemas/Alias")
            .unwrap()
            .unwrap();
        assert_eq!(schema.name(), Some("Widget"));
    }

    #[test]
    fn resolve_ref_cycle_fails_fast() {
        let logger = Logger::Disabled;
        let root = json!({
            "components": {
                "schemas": {
                    "A": { "$ref": "#/components/schemas/B" },
                    "B": { "$ref": "#/components/schemas/A" }
                }
            }
        });
        let cx = Context::new(&root, &logger);

        let result = cx.resolve_ref("#/components/schemas/A");
        assert!(matches!(
            result,
            Err(ComponentError::Ref(RefError::Cyclic { .. }))
        ));

        let result = cx.resolve_schema_ref("#/components/schemas/A");
        assert!(matches!(
            result,
            Err(SchemaError::Ref(RefError::Cyclic { .. }))
        ));
    }

    #[test]
    fn resolve_schema_ref_rejects_other_kinds() {
        let logger = Logger::Disabled;
        let root = json!({
            "components": {
                "schemas": {
                    "Body": { "$ref": "#/components/requestBodies/Body" }
                },
                "requestBodies": {
                    "Body": { "content": { "application/json": { "schema": {} } } }
                }
            }
        });
        let cx = Context::new(&root, &logger);

        let result = cx.resolve_schema_ref("#/components/schemas/Body");
        assert!(matches!(result, Err(SchemaError::NotASchema { .. })));
    }

    #[test]
    fn resolve_ref_builds_matching_wrapper() {
        let logger = Logger::Disabled;
        let root = json!({
            "components": {
                "schemas": { "Widget": { "type": "object" } },
                "requestBodies": {
                    "NewWidget": {
                        "content": { "application/json": { "schema": { "type": "object" } } }
                    }
                },
                "securitySchemes": {
                    "apiKey": { "type": "apiKey", "in": "header", "name": "X-Key" }
                }
            }
        });
        let cx = Context::new(&root, &logger);

        let c = cx.resolve_ref("#/components/schemas/Widget").unwrap().unwrap();
        assert_eq!(c.kind(), ComponentKind::Schemas);

        let c = cx
            .resolve_ref("#/components/requestBodies/NewWidget")
            .unwrap()
            .unwrap();
        assert_eq!(c.kind(), ComponentKind::RequestBodies);

        let scheme = cx
            .resolve_ref("#/components/securitySchemes/apiKey")
            .unwrap()
            .unwrap()
            .into_security_scheme()
            .unwrap();
        assert_eq!(scheme.name(), "apiKey");
        assert_eq!(scheme.scheme_type(), Some("apiKey"));
    }
}
