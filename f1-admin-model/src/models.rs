//! Entities as the backend serializes them.
//!
//! The backend preserves object identity: every object may carry a `$id` and a
//! later occurrence of the same object is replaced by `{ "$ref": "<id>" }`.
//! Nested entities are therefore modelled with [`Nested`], which keeps "not
//! sent", "sent as a pointer", "sent in part" and "sent in full" apart.

use core::fmt::{self, Display};

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::envelope::ReferenceIndex;

macro_rules! id_type {
    ($(#[doc = $doc:expr] $name:ident),*) => {
        $(
            #[doc = $doc]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub i64);

            impl Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    Display::fmt(&self.0, f)
                }
            }

            impl From<i64> for $name {
                fn from(value: i64) -> Self {
                    Self(value)
                }
            }
        )*
    };
}

id_type! {
    /// Surrogate key of a [`Driver`].
    DriverId,
    /// Surrogate key of a [`GrandPrix`].
    GrandPrixId,
    /// Surrogate key of a [`Participation`].
    ParticipationId
}

/// Value of a `$id` / `$ref` marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(pub String);

impl RefId {
    /// Markers are usually strings but some serializers emit numbers.
    #[must_use]
    pub fn from_marker(value: &Value) -> Option<Self> {
        match value {
            Value::String(string) => Some(Self(string.clone())),
            Value::Number(number) => Some(Self(number.to_string())),
            _ => None,
        }
    }

    /// Returns the `$ref` target if `value` is a reference object.
    #[must_use]
    pub fn reference_of(value: &Value) -> Option<Self> {
        value.as_object()?.get("$ref").and_then(Self::from_marker)
    }
}

impl Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RefId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RefId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_marker(&value).ok_or_else(|| {
            de::Error::custom(format!("expected a string or number marker, found {value}"))
        })
    }
}

/// A nested entity that may be missing, a `$ref` pointer, only partially
/// serialized, or fully present.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Nested<T> {
    Present(Box<T>),
    /// Unresolved pointer to an object serialized elsewhere in the document.
    Reference(RefId),
    /// Embedded object that lacks fields `T` requires. Kept raw so its
    /// remaining fields can still be shown.
    Partial(Value),
    #[default]
    Absent,
}

impl<T> Nested<T> {
    #[must_use]
    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(&**value),
            Self::Reference(_) | Self::Partial(_) | Self::Absent => None,
        }
    }

    #[must_use]
    pub const fn reference(&self) -> Option<&RefId> {
        match self {
            Self::Reference(reference) => Some(reference),
            Self::Present(_) | Self::Partial(_) | Self::Absent => None,
        }
    }

    #[must_use]
    pub const fn partial(&self) -> Option<&Value> {
        match self {
            Self::Partial(value) => Some(value),
            Self::Present(_) | Self::Reference(_) | Self::Absent => None,
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T: DeserializeOwned> Nested<T> {
    /// Never fails: an embedded object that doesn't decode as `T` becomes
    /// [`Nested::Partial`].
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            return Self::Absent;
        }
        if let Some(reference) = RefId::reference_of(&value) {
            return Self::Reference(reference);
        }
        match serde_json::from_value(value.clone()) {
            Ok(decoded) => Self::Present(Box::new(decoded)),
            Err(error) => {
                debug!(%error, "keeping incomplete nested entity");
                Self::Partial(value)
            }
        }
    }

    /// Replaces a resolvable `$ref` with the object it points at. Pointers
    /// that the index doesn't know stay as they are.
    pub fn hydrate(&mut self, index: &ReferenceIndex) {
        if let Self::Reference(reference) = self {
            if let Some(value) = index.lookup::<T>(reference) {
                *self = Self::Present(Box::new(value));
            }
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Nested<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl<T: Serialize> Serialize for Nested<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::Reference(reference) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", reference)?;
                map.end()
            }
            Self::Partial(value) => value.serialize(serializer),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

/// A back-reference collection (`{ "$id": .., "$values": [..] }`).
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub reference_id: Option<RefId>,
    pub values: Vec<Nested<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            reference_id: None,
            values: Vec::new(),
        }
    }
}

impl<T> Collection<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Nested<T>> {
        self.values.iter()
    }
}

impl<T: DeserializeOwned> Collection<T> {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let (reference_id, items) = match value {
            Value::Null => return Ok(Self::default()),
            Value::Array(items) => (None, items),
            Value::Object(mut object) => {
                let reference_id = object.get("$id").and_then(RefId::from_marker);
                match object.remove("$values") {
                    Some(Value::Array(items)) => (reference_id, items),
                    // a `$ref` to a collection or an object without values
                    None => (reference_id, Vec::new()),
                    Some(other) => {
                        return Err(de::Error::custom(format!(
                            "$values must be an array but got {other}"
                        )))
                    }
                }
            }
            other => {
                return Err(de::Error::custom(format!(
                    "expected a $values envelope or an array, found {other}"
                )))
            }
        };
        Ok(Self {
            reference_id,
            values: items.into_iter().map(Nested::from_value).collect(),
        })
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Collection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::from_value(Value::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(reference_id) = &self.reference_id {
            map.serialize_entry("$id", reference_id)?;
        }
        map.serialize_entry("$values", &self.values)?;
        map.end()
    }
}

// Embedded drivers sometimes carry the number as a string.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(number) => number
            .as_i64()
            .and_then(|number| i32::try_from(number).ok())
            .ok_or_else(|| de::Error::custom(format!("driver number {number} out of range"))),
        Value::String(string) => string
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("driver number {string:?} is not a number"))),
        other => Err(de::Error::custom(format!(
            "expected a driver number, found {other}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<RefId>,
    pub id: DriverId,
    #[serde(default, deserialize_with = "number_or_string")]
    pub driver_number: i32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub acronym: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub participations: Collection<Participation>,
}

impl Driver {
    #[must_use]
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => format!("Driver {}", self.id),
        }
    }

    /// Team name, `None` for missing or blank values.
    #[must_use]
    pub fn team(&self) -> Option<&str> {
        self.team_name
            .as_deref()
            .map(str::trim)
            .filter(|team| !team.is_empty())
    }

    /// Number of races listed in the embedded participations.
    #[must_use]
    pub fn race_count(&self) -> usize {
        self.participations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrandPrix {
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<RefId>,
    pub id: GrandPrixId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub laps: i32,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub participations: Collection<Participation>,
}

impl GrandPrix {
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<RefId>,
    pub id: ParticipationId,
    pub driver_id: DriverId,
    pub grand_prix_id: GrandPrixId,
    #[serde(default)]
    pub driver: Nested<Driver>,
    #[serde(default)]
    pub grand_prix: Nested<GrandPrix>,
}

impl Participation {
    #[must_use]
    pub fn pair(&self) -> (DriverId, GrandPrixId) {
        (self.driver_id, self.grand_prix_id)
    }

    /// Resolves the nested driver and Grand Prix pointers against `index`.
    pub fn hydrate(&mut self, index: &ReferenceIndex) {
        self.driver.hydrate(index);
        self.grand_prix.hydrate(index);
    }

    #[must_use]
    pub fn driver_label(&self) -> String {
        if let Some(driver) = self.driver.present() {
            return driver.full_name();
        }
        let first = partial_text(&self.driver, "firstName");
        let last = partial_text(&self.driver, "lastName");
        match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => "Unknown driver".to_owned(),
        }
    }

    #[must_use]
    pub fn grand_prix_label(&self) -> String {
        self.grand_prix
            .present()
            .map(|grand_prix| grand_prix.name.trim())
            .or_else(|| partial_text(&self.grand_prix, "name"))
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown GP")
            .to_owned()
    }

    #[must_use]
    pub fn location_label(&self) -> String {
        self.grand_prix
            .present()
            .map(|grand_prix| grand_prix.location.trim())
            .or_else(|| partial_text(&self.grand_prix, "location"))
            .filter(|location| !location.is_empty())
            .unwrap_or("Unknown Location")
            .to_owned()
    }
}

fn partial_text<'a, T>(nested: &'a Nested<T>, field: &str) -> Option<&'a str> {
    nested
        .partial()?
        .get(field)?
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
