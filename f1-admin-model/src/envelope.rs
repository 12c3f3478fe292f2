//! Decoding of the backend's reference-preserving json.
//!
//! Decoding happens in two passes. The first pass walks the whole document and
//! indexes every object that carries a `$id`. The second pass deserializes the
//! typed entities; nested `$ref` pointers stay [`Nested::Reference`] until a
//! caller resolves them through the [`ReferenceIndex`].

use std::borrow::Cow;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::models::{Nested, RefId};

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    objects: HashMap<RefId, Value>,
}

impl ReferenceIndex {
    #[must_use]
    pub fn build(document: &Value) -> Self {
        let mut index = Self::default();
        index.visit(document);
        index
    }

    fn visit(&mut self, value: &Value) {
        match value {
            Value::Object(object) => {
                if let Some(id) = object.get("$id").and_then(RefId::from_marker) {
                    self.objects.entry(id).or_insert_with(|| value.clone());
                }
                object.values().for_each(|child| self.visit(child));
            }
            Value::Array(items) => items.iter().for_each(|child| self.visit(child)),
            _ => {}
        }
    }

    #[must_use]
    pub fn get(&self, id: &RefId) -> Option<&Value> {
        self.objects.get(id)
    }

    /// Deserializes the object registered under `id`. Returns `None` if the
    /// id is unknown or the object doesn't have the shape of `T`.
    #[must_use]
    pub fn lookup<T: DeserializeOwned>(&self, id: &RefId) -> Option<T> {
        self.get(id)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    #[must_use]
    pub fn resolve<'a, T: DeserializeOwned>(&self, nested: &'a Nested<T>) -> Option<Cow<'a, T>>
    where
        T: Clone,
    {
        match nested {
            Nested::Present(value) => Some(Cow::Borrowed(&**value)),
            Nested::Reference(reference) => self.lookup(reference).map(Cow::Owned),
            Nested::Partial(_) | Nested::Absent => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A decoded collection response (`{ "$values": [..] }`).
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub values: Vec<T>,
    pub index: ReferenceIndex,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            index: ReferenceIndex::default(),
        }
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Accepts the envelope object as well as a bare array. A document
    /// without `$values` decodes to an empty collection.
    pub fn from_value(document: Value) -> Result<Self> {
        let index = ReferenceIndex::build(&document);
        let items = match document {
            Value::Array(items) => items,
            Value::Object(mut object) => match object.remove("$values") {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) => Vec::new(),
                Some(other) => return Err(ModelError::ValuesNotAnArray(json_kind(&other))),
            },
            Value::Null => Vec::new(),
            other => return Err(ModelError::ValuesNotAnArray(json_kind(&other))),
        };

        let values = items
            .into_iter()
            .enumerate()
            .filter_map(|(position, item)| decode_item(&index, position, item).transpose())
            .collect::<Result<Vec<T>>>()?;

        Ok(Self { values, index })
    }
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// A top level element is a `$ref` when the object already appeared nested
// inside an earlier element. Null elements are skipped.
fn decode_item<T: DeserializeOwned>(
    index: &ReferenceIndex,
    position: usize,
    item: Value,
) -> Result<Option<T>> {
    let item = match RefId::reference_of(&item) {
        Some(reference) => match index.get(&reference) {
            Some(target) => target.clone(),
            None => {
                return Err(ModelError::DanglingReference {
                    index: position,
                    reference,
                })
            }
        },
        None if item.is_null() => return Ok(None),
        None => item,
    };
    serde_path_to_error::deserialize(item)
        .map(Some)
        .map_err(|source| ModelError::Element {
            index: position,
            source,
        })
}

/// A single decoded entity together with the references it contains.
#[derive(Debug, Clone)]
pub struct Document<T> {
    pub value: T,
    pub index: ReferenceIndex,
}

impl<T: DeserializeOwned> Document<T> {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let document: Value = serde_json::from_slice(bytes)?;
        let index = ReferenceIndex::build(&document);
        let value = serde_path_to_error::deserialize(document).map_err(ModelError::Entity)?;
        Ok(Self { value, index })
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
