//! Interpreted payloads.
//!
//! [`Schema::interpret`](crate::Schema::interpret) narrows raw JSON to the
//! shape a schema declares. The result is read-only and serialises back to
//! plain JSON.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::SchemaError;
use crate::schema::Schema;

/// A value produced by interpretation.
#[derive(Debug, Clone)]
pub enum Interpreted<'a> {
    /// Explicit `null`, whatever the declared type.
    Null,
    /// Scalar or untyped data, passed through unchanged.
    Raw(Value),
    Object(Object<'a>),
    Array(Vec<Interpreted<'a>>),
    /// Present in the data but of the wrong shape for its schema. Keeps the
    /// slot of an array element or the presence of an object key.
    Discarded,
}

impl<'a> Interpreted<'a> {
    /// Plain JSON equivalent of this value.
    pub fn serialise(&self) -> Value {
        match self {
            Interpreted::Null | Interpreted::Discarded => Value::Null,
            Interpreted::Raw(value) => value.clone(),
            Interpreted::Object(object) => object.serialise(),
            Interpreted::Array(items) => {
                Value::Array(items.iter().map(Interpreted::serialise).collect())
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Interpreted::Null)
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Interpreted::Discarded)
    }

    pub fn as_object(&self) -> Option<&Object<'a>> {
        match self {
            Interpreted::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Interpreted<'a>]> {
        match self {
            Interpreted::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The passed-through value of a scalar or untyped interpretation.
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Interpreted::Raw(value) => Some(value),
            _ => None,
        }
    }
}

impl Serialize for Interpreted<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.serialise().serialize(serializer)
    }
}

/// Raw object data bound to an object schema.
///
/// Holds only the keys present in the raw data that the schema declares or
/// matches through `additionalProperties`. Absent properties stay absent.
#[derive(Debug, Clone)]
pub struct Object<'a> {
    schema: Schema<'a>,
    props: IndexMap<String, Interpreted<'a>>,
}

impl<'a> Object<'a> {
    /// Interpret `data` against `schema`.
    ///
    /// Unknown properties are dropped with a warning naming the schema path
    /// and the property. A matched key whose value has the wrong shape is kept
    /// as [`Interpreted::Discarded`], so it still counts as present.
    ///
    /// # Errors
    ///
    /// Hard errors from building property facets or nested schemas.
    pub fn new(
        cx: &Context<'a>,
        schema: Schema<'a>,
        data: &Map<String, Value>,
    ) -> Result<Self, SchemaError> {
        let mut props = IndexMap::with_capacity(data.len());

        for (name, value) in data {
            let Some(prop) = schema.named_prop(cx, name)? else {
                cx.logger().warn(&format!(
                    "{}: unknown property \"{}\", dropping",
                    schema.path(),
                    name
                ));
                continue;
            };

            let interpreted = prop
                .schema()
                .interpret(cx, value)?
                .unwrap_or(Interpreted::Discarded);
            props.insert(name.clone(), interpreted);
        }

        Ok(Self { schema, props })
    }

    /// Interpreted value of a property.
    ///
    /// `None` if it was not in the data, or if its value was discarded for
    /// having the wrong shape. Use [`Object::has`] to tell the two apart.
    pub fn prop(&self, name: &str) -> Option<&Interpreted<'a>> {
        self.props.get(name).filter(|v| !v.is_discarded())
    }

    /// Whether the property was present in the data, including `null`, `0`,
    /// `false` and discarded values.
    pub fn has(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    pub fn schema(&self) -> &Schema<'a> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Interpreted<'a>)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain JSON object of the stored properties. Discarded values are
    /// left out.
    pub fn serialise(&self) -> Value {
        let map: Map<String, Value> = self
            .props
            .iter()
            .filter(|(_, value)| !value.is_discarded())
            .map(|(name, value)| (name.clone(), value.serialise()))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for Object<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.serialise().serialize(serializer)
    }
}
