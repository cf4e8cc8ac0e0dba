//! Schema nodes and property facets.
//!
//! A [`Schema`] wraps one raw schema fragment borrowed from the document. The
//! fragment is classified and normalized once at construction: the caller's
//! tree is never written to, defaults (`type`, `properties`, `required`,
//! `additionalProperties`) live in derived fields.

use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::SchemaError;
use crate::object::{Interpreted, Object};
use crate::types::{empty_schema, json_type_name, PathSegment, SchemaPath, SchemaType};

/// Name given to the facet returned by [`Schema::additional_prop`].
pub const WILDCARD_NAME: &str = "*";

/// One schema fragment, classified.
#[derive(Debug, Clone)]
pub struct Schema<'a> {
    raw: &'a Map<String, Value>,
    name: Option<String>,
    path: SchemaPath,
    schema_type: SchemaType,
    properties: Option<&'a Map<String, Value>>,
    required: Vec<&'a str>,
    // None when additionalProperties is absent or false
    additional: Option<&'a Value>,
}

impl<'a> Schema<'a> {
    /// Build a schema node from an inline fragment.
    ///
    /// `$ref` fragments are not followed here; navigation through a
    /// [`Context`] does that.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidDefinition` if the fragment is not an object or
    /// `additionalProperties` is neither a boolean nor a schema,
    /// `SchemaError::InvalidType` if `type` is outside the allowed set.
    pub fn new(raw: &'a Value, path: SchemaPath) -> Result<Self, SchemaError> {
        let map = raw.as_object().ok_or_else(|| SchemaError::InvalidDefinition {
            path: path.to_string(),
            actual: json_type_name(raw).to_string(),
        })?;

        let schema_type = match map.get("type") {
            None => SchemaType::Any,
            Some(Value::String(s)) => {
                SchemaType::parse(s).ok_or_else(|| SchemaError::InvalidType {
                    path: path.to_string(),
                    value: s.clone(),
                })?
            }
            Some(other) => {
                return Err(SchemaError::InvalidType {
                    path: path.to_string(),
                    value: other.to_string(),
                })
            }
        };

        let required: Vec<&'a str> = map
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let additional = match map.get("additionalProperties") {
            None | Some(Value::Bool(false)) => None,
            Some(Value::Bool(true)) => Some(empty_schema()),
            Some(schema @ Value::Object(_)) => Some(schema),
            Some(other) => {
                return Err(SchemaError::InvalidDefinition {
                    path: path.child(PathSegment::Prop(WILDCARD_NAME.into())).to_string(),
                    actual: json_type_name(other).to_string(),
                })
            }
        };

        Ok(Self {
            raw: map,
            name: None,
            path,
            schema_type,
            properties: map.get("properties").and_then(|v| v.as_object()),
            required,
            additional,
        })
    }

    /// Build a schema node for a named component.
    pub fn named(raw: &'a Value, name: &str) -> Result<Self, SchemaError> {
        let mut schema = Self::new(raw, SchemaPath::named(name))?;
        schema.name = Some(name.to_string());
        Ok(schema)
    }

    /// Re-root a resolved component under the path it was reached from.
    pub(crate) fn rebased(mut self, parent: &SchemaPath) -> Self {
        if parent.segments().is_empty() {
            return self;
        }
        let last = self
            .path
            .segments()
            .last()
            .cloned()
            .unwrap_or(PathSegment::Items);
        self.path = parent.child(last);
        self
    }

    /// Component name, for top-level named schemas only.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    pub fn raw(&self) -> &'a Map<String, Value> {
        self.raw
    }

    /// Rendered diagnostic path, e.g. `schema:Widget/prop:tags/[]`.
    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn diagnostic_path(&self) -> &SchemaPath {
        &self.path
    }

    /// Names listed in `required`, in declaration order.
    pub fn required(&self) -> &[&'a str] {
        &self.required
    }

    /// Whether undeclared property names are matched by a wildcard facet.
    pub fn allows_additional(&self) -> bool {
        self.additional.is_some()
    }

    /// All declared properties, in declaration order.
    pub fn all_props(&self, cx: &Context<'a>) -> Result<Vec<Property<'a>>, SchemaError> {
        self.declared()
            .map(|(name, def)| self.declared_prop(cx, name, def))
            .collect()
    }

    /// Declared properties listed in `required`.
    ///
    /// Required names that are not declared are ignored, one warning each.
    pub fn required_props(&self, cx: &Context<'a>) -> Result<Vec<Property<'a>>, SchemaError> {
        for name in &self.required {
            if !self.properties.is_some_and(|p| p.contains_key(*name)) {
                cx.logger().warn(&format!(
                    "{}: required property \"{}\" is not declared in properties",
                    self.path, name
                ));
            }
        }

        self.declared()
            .filter(|(name, _)| self.required.contains(&name.as_str()))
            .map(|(name, def)| self.declared_prop(cx, name, def))
            .collect()
    }

    /// Declared properties not listed in `required`.
    pub fn optional_props(&self, cx: &Context<'a>) -> Result<Vec<Property<'a>>, SchemaError> {
        self.declared()
            .filter(|(name, _)| !self.required.contains(&name.as_str()))
            .map(|(name, def)| self.declared_prop(cx, name, def))
            .collect()
    }

    /// Look up a property by name.
    ///
    /// Falls back to a wildcard facet carrying `name` when
    /// `additionalProperties` allows it. `None` if the name is unknown.
    pub fn named_prop(
        &self,
        cx: &Context<'a>,
        name: &str,
    ) -> Result<Option<Property<'a>>, SchemaError> {
        if let Some(def) = self.properties.and_then(|p| p.get(name)) {
            return self.declared_prop(cx, name, def).map(Some);
        }
        self.wildcard_prop(cx, name)
    }

    /// The `additionalProperties` facet, named `*`.
    pub fn additional_prop(&self, cx: &Context<'a>) -> Result<Option<Property<'a>>, SchemaError> {
        self.wildcard_prop(cx, WILDCARD_NAME)
    }

    /// Item schema of an array schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::NotAnArray` on non-array schemas,
    /// `SchemaError::MissingItems` when `items` is absent.
    pub fn of(&self, cx: &Context<'a>) -> Result<Schema<'a>, SchemaError> {
        if self.schema_type != SchemaType::Array {
            return Err(SchemaError::NotAnArray {
                path: self.path(),
            });
        }
        let items = self.raw.get("items").ok_or_else(|| SchemaError::MissingItems {
            path: self.path(),
        })?;

        cx.schema_at(Some(items), self.path.child(PathSegment::Items))
    }

    /// Interpret raw data against this schema.
    ///
    /// `null` passes through whatever the type. Objects become
    /// [`Object`]s narrowed to the declared and wildcard properties, arrays
    /// are interpreted element-wise, everything else is returned unchanged.
    /// Data of the wrong shape for an object or array schema is discarded
    /// with a warning and yields `None`. Inside an array such an element
    /// keeps its position as [`Interpreted::Discarded`].
    ///
    /// # Errors
    ///
    /// Hard errors from navigating nested schemas (invalid types, arrays
    /// without items, unresolved refs).
    pub fn interpret(
        &self,
        cx: &Context<'a>,
        data: &Value,
    ) -> Result<Option<Interpreted<'a>>, SchemaError> {
        if data.is_null() {
            return Ok(Some(Interpreted::Null));
        }

        match self.schema_type {
            SchemaType::Object => {
                let Some(map) = data.as_object() else {
                    self.discard(cx, data);
                    return Ok(None);
                };
                Ok(Some(Interpreted::Object(Object::new(cx, self.clone(), map)?)))
            }
            SchemaType::Array => {
                let Some(elements) = data.as_array() else {
                    self.discard(cx, data);
                    return Ok(None);
                };
                let item_schema = self.of(cx)?;
                let mut interpreted = Vec::with_capacity(elements.len());
                for element in elements {
                    let value = item_schema.interpret(cx, element)?;
                    interpreted.push(value.unwrap_or(Interpreted::Discarded));
                }
                Ok(Some(Interpreted::Array(interpreted)))
            }
            SchemaType::String
            | SchemaType::Number
            | SchemaType::Integer
            | SchemaType::Boolean
            | SchemaType::Any => Ok(Some(Interpreted::Raw(data.clone()))),
        }
    }

    fn discard(&self, cx: &Context<'a>, data: &Value) {
        cx.logger().warn(&format!(
            "{}: expected {} data, got {}, discarding",
            self.path,
            self.schema_type,
            json_type_name(data)
        ));
    }

    fn declared(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.properties.into_iter().flat_map(|p| p.iter())
    }

    fn declared_prop(
        &self,
        cx: &Context<'a>,
        name: &str,
        def: &'a Value,
    ) -> Result<Property<'a>, SchemaError> {
        let path = self.path.child(PathSegment::Prop(name.to_string()));
        Property::new(cx, name, Some(def), path)
    }

    fn wildcard_prop(
        &self,
        cx: &Context<'a>,
        name: &str,
    ) -> Result<Option<Property<'a>>, SchemaError> {
        let Some(def) = self.additional else {
            return Ok(None);
        };
        let path = self.path.child(PathSegment::Prop(name.to_string()));
        let mut prop = Property::new(cx, name, Some(def), path)?;
        prop.wildcard = true;
        Ok(Some(prop))
    }
}

/// A named view onto one `properties` entry, or the wildcard facet.
#[derive(Debug, Clone)]
pub struct Property<'a> {
    name: String,
    schema: Schema<'a>,
    wildcard: bool,
}

impl<'a> Property<'a> {
    /// Build a facet. A `$ref` definition is resolved and its target's shape
    /// adopted.
    ///
    /// # Errors
    ///
    /// `SchemaError::MissingName` for an empty name,
    /// `SchemaError::MissingDefinition` for an absent definition,
    /// `SchemaError::UnresolvedRef` when a `$ref` names nothing.
    pub fn new(
        cx: &Context<'a>,
        name: &str,
        def: Option<&'a Value>,
        path: SchemaPath,
    ) -> Result<Self, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::MissingName {
                path: path.to_string(),
            });
        }
        let schema = cx.schema_at(def, path)?;
        Ok(Self {
            name: name.to_string(),
            schema,
            wildcard: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema.schema_type()
    }

    pub fn descr(&self) -> Option<&'a str> {
        self.schema.raw().get("description").and_then(|v| v.as_str())
    }

    pub fn enum_values(&self) -> Option<&'a Vec<Value>> {
        self.schema.raw().get("enum").and_then(|v| v.as_array())
    }

    pub fn example(&self) -> Option<&'a Value> {
        self.schema.raw().get("example")
    }

    pub fn read_only(&self) -> bool {
        self.schema
            .raw()
            .get("readOnly")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// True for facets synthesized from `additionalProperties`.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn schema(&self) -> &Schema<'a> {
        &self.schema
    }
}
