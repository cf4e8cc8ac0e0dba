//! The top-level OpenAPI document.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::context::{component_ref, Component, Context};
use crate::error::{ComponentError, DocumentError, SchemaError};
use crate::logger::Logger;
use crate::operation::Operation;
use crate::schema::Schema;
use crate::types::{ComponentKind, HTTP_METHODS};

/// Options for opening a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    /// Diagnostic sink. Disabled by default.
    pub logger: Logger,
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// `true` sends diagnostics to the console, `false` drops them.
    pub fn debug(mut self, debug: bool) -> Self {
        self.logger = Logger::from(debug);
        self
    }
}

// (path, method) keys in declaration order, plus operationId lookup.
#[derive(Debug, Default)]
struct OperationIndex {
    entries: Vec<(String, String)>,
    by_id: HashMap<String, usize>,
}

/// A validated OpenAPI 3 document.
///
/// The raw tree is owned and never modified. Wrappers returned by the
/// accessors borrow it.
#[derive(Debug)]
pub struct Document {
    raw: Value,
    servers: Vec<String>,
    logger: Logger,
    index: OnceLock<OperationIndex>,
}

impl Document {
    /// Validate and wrap a parsed document.
    ///
    /// # Errors
    ///
    /// `DocumentError::NotOpenApi` without a string `openapi` field,
    /// `DocumentError::UnsupportedVersion` unless it starts with `3.`,
    /// `DocumentError::InvalidServers` if `servers` is not a list of objects
    /// with a `url`.
    pub fn new(raw: Value, options: DocumentOptions) -> Result<Self, DocumentError> {
        let version = raw
            .get("openapi")
            .and_then(|v| v.as_str())
            .ok_or(DocumentError::NotOpenApi)?;
        if !version.starts_with("3.") {
            return Err(DocumentError::UnsupportedVersion {
                version: version.to_string(),
            });
        }

        let servers = match raw.get("servers") {
            None => Vec::new(),
            Some(Value::Array(servers)) => servers
                .iter()
                .map(|server| {
                    server
                        .get("url")
                        .and_then(|u| u.as_str())
                        .map(String::from)
                        .ok_or_else(|| DocumentError::InvalidServers {
                            message: "server without url".into(),
                        })
                })
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(DocumentError::InvalidServers {
                    message: "servers is not an array".into(),
                })
            }
        };

        Ok(Self {
            raw,
            servers,
            logger: options.logger,
            index: OnceLock::new(),
        })
    }

    /// Server URLs, in declaration order.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// `info.title`, or a top-level `title` if there is no `info`.
    pub fn title(&self) -> Option<&str> {
        self.raw
            .get("info")
            .and_then(|i| i.get("title"))
            .or_else(|| self.raw.get("title"))
            .and_then(|v| v.as_str())
    }

    pub fn version(&self) -> &str {
        self.raw
            .get("openapi")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Context for navigating this document's wrappers.
    pub fn context(&self) -> Context<'_> {
        Context::new(&self.raw, &self.logger)
    }

    /// Resolve a `#/components/<kind>/<name>` reference.
    pub fn resolve_ref(&self, reference: &str) -> Result<Option<Component<'_>>, ComponentError> {
        self.context().resolve_ref(reference)
    }

    /// Named component schema.
    pub fn schema(&self, name: &str) -> Result<Option<Schema<'_>>, SchemaError> {
        self.context()
            .resolve_schema_ref(&component_ref(ComponentKind::Schemas, name))
    }

    /// All operations, ordered by path then method declaration.
    pub fn operations(&self) -> Result<Vec<Operation<'_>>, ComponentError> {
        self.index()
            .entries
            .iter()
            .map(|(path, method)| self.operation_at(path, method))
            .collect()
    }

    /// Operation by `operationId`.
    pub fn named_operation(&self, id: &str) -> Result<Option<Operation<'_>>, ComponentError> {
        let index = self.index();
        index
            .by_id
            .get(id)
            .map(|&i| {
                let (path, method) = &index.entries[i];
                self.operation_at(path, method)
            })
            .transpose()
    }

    // Both keys are borrowed from the index, so each lookup is a map hit.
    fn operation_at<'s>(
        &'s self,
        path: &'s str,
        method: &'s str,
    ) -> Result<Operation<'s>, ComponentError> {
        let raw = self
            .paths()
            .and_then(|paths| paths.get(path))
            .ok_or_else(|| ComponentError::MissingField {
                path: "paths".into(),
                field: path.to_string(),
            })?;
        let raw = raw
            .as_object()
            .and_then(|item| item.get(method))
            .ok_or_else(|| ComponentError::MissingField {
                path: format!("paths/{}", path),
                field: method.to_string(),
            })?;
        Operation::new(path, method, raw)
    }

    fn paths(&self) -> Option<&serde_json::Map<String, Value>> {
        self.raw.get("paths").and_then(|p| p.as_object())
    }

    fn index(&self) -> &OperationIndex {
        self.index.get_or_init(|| {
            let mut index = OperationIndex::default();
            for (path, item) in self.paths().into_iter().flatten() {
                let Some(item) = item.as_object() else {
                    self.logger
                        .warn(&format!("paths/{}: path item is not an object, skipping", path));
                    continue;
                };
                for (method, op) in item {
                    if !HTTP_METHODS.contains(&method.as_str()) {
                        continue;
                    }
                    if let Some(id) = op.get("operationId").and_then(|v| v.as_str()) {
                        if index.by_id.contains_key(id) {
                            self.logger
                                .warn(&format!("duplicate operationId \"{}\", keeping first", id));
                        } else {
                            index.by_id.insert(id.to_string(), index.entries.len());
                        }
                    }
                    index.entries.push((path.clone(), method.clone()));
                }
            }
            tracing::debug!(operations = index.entries.len(), "built operation index");
            index
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefError;
    use serde_json::json;

    fn min_doc() -> Value {
        json!({ "openapi": "3.0.0" })
    }

    #[test]
    fn new_validates_version() {
        assert!(Document::new(min_doc(), DocumentOptions::new()).is_ok());
        assert!(matches!(
            Document::new(json!({}), DocumentOptions::new()),
            Err(DocumentError::NotOpenApi)
        ));
        for version in ["2.4.6", "1.2.3", "4.5.6", "0.0.1"] {
            assert!(matches!(
                Document::new(json!({ "openapi": version }), DocumentOptions::new()),
                Err(DocumentError::UnsupportedVersion { .. })
            ));
        }
    }

    #[test]
    fn new_validates_servers() {
        let result = Document::new(
            json!({ "openapi": "3.0.0", "servers": {} }),
            DocumentOptions::new(),
        );
        assert!(matches!(result, Err(DocumentError::InvalidServers { .. })));

        let result = Document::new(
            json!({ "openapi": "3.0.0", "servers": [{}] }),
            DocumentOptions::new(),
        );
        assert!(matches!(result, Err(DocumentError::InvalidServers { .. })));

        let result = Document::new(
            json!({ "openapi": "3.0.0", "servers": [{ "foo": "bar" }] }),
            DocumentOptions::new(),
        );
        assert!(matches!(result, Err(DocumentError::InvalidServers { .. })));
    }

    #[test]
    fn servers_default_empty() {
        let doc = Document::new(min_doc(), DocumentOptions::new()).unwrap();
        assert!(doc.servers().is_empty());

        let doc = Document::new(
            json!({
                "openapi": "3.0.0",
                "servers": [{ "url": "http://host:1/" }, { "url": "http://host:2/" }]
            }),
            DocumentOptions::new(),
        )
        .unwrap();
        assert_eq!(doc.servers(), ["http://host:1/", "http://host:2/"]);
    }

    #[test]
    fn title_from_info_or_top_level() {
        let doc = Document::new(min_doc(), DocumentOptions::new()).unwrap();
        assert_eq!(doc.title(), None);

        let doc = Document::new(
            json!({ "openapi": "3.0.0", "info": { "title": "Pets", "version": "1" } }),
            DocumentOptions::new(),
        )
        .unwrap();
        assert_eq!(doc.title(), Some("Pets"));

        let doc = Document::new(
            json!({ "openapi": "3.0.0", "title": "some title" }),
            DocumentOptions::new(),
        )
        .unwrap();
        assert_eq!(doc.title(), Some("some title"));
    }

    #[test]
    fn raw_tree_is_not_modified() {
        let raw = min_doc();
        let doc = Document::new(raw.clone(), DocumentOptions::new()).unwrap();
        assert!(doc.operations().unwrap().is_empty());
        assert_eq!(doc.raw(), &raw);
    }

    #[test]
    fn resolve_ref_errors_versus_absence() {
        let doc = Document::new(min_doc(), DocumentOptions::new()).unwrap();
        assert!(matches!(
            doc.resolve_ref("#/components/parameters/x"),
            Err(ComponentError::Ref(RefError::UnsupportedComponent { .. }))
        ));
        assert!(doc.resolve_ref("#/components/schemas/missing").unwrap().is_none());
        assert!(doc.schema("missing").unwrap().is_none());
    }

    #[test]
    fn operations_indexed_by_id() {
        let doc = Document::new(
            json!({
                "openapi": "3.0.0",
                "paths": {
                    "/pets": {
                        "summary": "pets",
                        "parameters": [],
                        "get": { "operationId": "listPets" },
                        "post": { "operationId": "createPet" }
                    },
                    "/pets/{id}": {
                        "get": { "operationId": "getPet" }
                    }
                }
            }),
            DocumentOptions::new(),
        )
        .unwrap();

        let ops = doc.operations().unwrap();
        let ids: Vec<_> = ops.iter().map(|op| op.id().unwrap()).collect();
        assert_eq!(ids, ["listPets", "createPet", "getPet"]);

        let op = doc.named_operation("getPet").unwrap().unwrap();
        assert_eq!(op.path(), "pets/{id}");
        assert_eq!(op.method(), "GET");
        assert!(doc.named_operation("deletePet").unwrap().is_none());
    }

    #[test]
    fn operation_lookup_by_keys() {
        let doc = Document::new(
            json!({
                "openapi": "3.0.0",
                "paths": { "/a": { "get": {}, "put": {} }, "/b": { "post": {} } }
            }),
            DocumentOptions::new(),
        )
        .unwrap();

        let op = doc.operation_at("/b", "post").unwrap();
        assert_eq!(op.method(), "POST");
        assert_eq!(op.path(), "b");
        assert!(matches!(
            doc.operation_at("/c", "get"),
            Err(ComponentError::MissingField { .. })
        ));
        assert!(matches!(
            doc.operation_at("/a", "post"),
            Err(ComponentError::MissingField { field, .. }) if field == "post"
        ));
        assert_eq!(doc.operations().unwrap().len(), 3);
    }

    #[test]
    fn options_builder() {
        let options = DocumentOptions::new().debug(true);
        assert!(options.logger.is_enabled());
        let options = DocumentOptions::new().debug(true).logger(Logger::Disabled);
        assert!(!options.logger.is_enabled());
    }
}
