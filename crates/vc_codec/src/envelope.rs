//! Envelopes: the composite-value shapes of the exchange tree.
//!
//! A composite value is encoded as one of two map shapes:
//!
//! ```text
//! value envelope:  { "type": "Node", "id": 0, "fields": { ... } }
//! back-reference:  { "ref": 0 }
//! ```
//!
//! The id of a value envelope is assigned by the encoder on first visit.
//! A back-reference names an id assigned elsewhere in the same tree, either
//! earlier (a repeat or a cycle) or later (a forward reference).

use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::value::{Map, Value};

// -----------------------------------------------------------------------------
// Keys

pub const TYPE_KEY: &str = "type";
pub const ID_KEY: &str = "id";
pub const FIELDS_KEY: &str = "fields";
pub const REF_KEY: &str = "ref";

// -----------------------------------------------------------------------------
// RefId

/// The integer identity of a value envelope within one encoded tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefId(pub u32);

impl RefId {
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<RefId> for Value {
    #[inline]
    fn from(value: RefId) -> Self {
        Value::Int(i64::from(value.0))
    }
}

// -----------------------------------------------------------------------------
// EnvelopeError

/// The value is not a well-formed envelope.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EnvelopeError {
    #[error("expected an envelope map, found {0}")]
    NotAMap(&'static str),

    #[error("envelope is missing `{0}`")]
    MissingKey(&'static str),

    #[error("envelope key `{key}` must be {expected}, found {found}")]
    InvalidKey {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("envelope id {0} is not a valid id")]
    InvalidId(i64),

    #[error("unexpected envelope key `{0}`")]
    UnexpectedKey(String),
}

// -----------------------------------------------------------------------------
// Envelope

/// A validated view over an envelope map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope<'a> {
    /// A value envelope: a new object with its id and fields.
    Object {
        tag: &'a str,
        id: RefId,
        fields: &'a Map,
    },
    /// A back-reference to the object with the given id.
    Ref(RefId),
}

impl<'a> Envelope<'a> {
    /// Checks the shape of `value` and returns its envelope view.
    ///
    /// Unknown keys are rejected, so a map cannot be both a value envelope
    /// and a back-reference.
    pub fn parse(value: &'a Value) -> Result<Self, EnvelopeError> {
        let map = value
            .as_map()
            .ok_or(EnvelopeError::NotAMap(value.kind()))?;

        if let Some(id) = map.get(REF_KEY) {
            if let Some(key) = map.keys().find(|key| key.as_str() != REF_KEY) {
                return Err(EnvelopeError::UnexpectedKey(key.clone()));
            }
            return parse_id(REF_KEY, id).map(Envelope::Ref);
        }

        if let Some(key) = map
            .keys()
            .find(|key| !matches!(key.as_str(), TYPE_KEY | ID_KEY | FIELDS_KEY))
        {
            return Err(EnvelopeError::UnexpectedKey(key.clone()));
        }

        let tag = required(map, TYPE_KEY)?;
        let tag = tag.as_str().ok_or(EnvelopeError::InvalidKey {
            key: TYPE_KEY,
            expected: "a string",
            found: tag.kind(),
        })?;

        let id = parse_id(ID_KEY, required(map, ID_KEY)?)?;

        let fields = required(map, FIELDS_KEY)?;
        let fields = fields.as_map().ok_or(EnvelopeError::InvalidKey {
            key: FIELDS_KEY,
            expected: "a map",
            found: fields.kind(),
        })?;

        Ok(Envelope::Object { tag, id, fields })
    }

    /// Returns the id this envelope declares or refers to.
    #[inline]
    pub const fn id(&self) -> RefId {
        match self {
            Self::Object { id, .. } | Self::Ref(id) => *id,
        }
    }
}

#[inline]
fn required<'a>(map: &'a Map, key: &'static str) -> Result<&'a Value, EnvelopeError> {
    map.get(key).ok_or(EnvelopeError::MissingKey(key))
}

fn parse_id(key: &'static str, value: &Value) -> Result<RefId, EnvelopeError> {
    let raw = value.as_i64().ok_or(EnvelopeError::InvalidKey {
        key,
        expected: "an integer",
        found: value.kind(),
    })?;
    u32::try_from(raw)
        .map(RefId)
        .map_err(|_| EnvelopeError::InvalidId(raw))
}

// -----------------------------------------------------------------------------
// Builders

/// Builds a value envelope.
pub fn object_envelope(tag: &str, id: RefId, fields: Map) -> Value {
    let mut map = Map::new();
    map.insert(String::from(TYPE_KEY), Value::from(tag));
    map.insert(String::from(ID_KEY), Value::from(id));
    map.insert(String::from(FIELDS_KEY), Value::Map(fields));
    Value::Map(map)
}

/// Builds a back-reference envelope.
pub fn ref_envelope(id: RefId) -> Value {
    let mut map = Map::new();
    map.insert(String::from(REF_KEY), Value::from(id));
    Value::Map(map)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Envelope, EnvelopeError, RefId, object_envelope, ref_envelope};
    use crate::value::{Map, Value};
    use alloc::vec;

    #[test]
    fn parse_shapes() {
        let value = object_envelope("Node", RefId(4), Map::new());
        let Envelope::Object { tag, id, fields } = Envelope::parse(&value).unwrap() else {
            panic!("expected a value envelope");
        };
        assert_eq!((tag, id), ("Node", RefId(4)));
        assert!(fields.is_empty());

        let value = ref_envelope(RefId(9));
        assert_eq!(Envelope::parse(&value), Ok(Envelope::Ref(RefId(9))));
    }

    #[test]
    fn malformed() {
        assert_eq!(
            Envelope::parse(&Value::List(vec![])),
            Err(EnvelopeError::NotAMap("list"))
        );

        let mut map = Map::new();
        map.insert("ref".into(), Value::Int(-1));
        assert_eq!(
            Envelope::parse(&Value::Map(map.clone())),
            Err(EnvelopeError::InvalidId(-1))
        );

        map.insert("ref".into(), Value::Int(1));
        map.insert("type".into(), Value::from("Node"));
        assert_eq!(
            Envelope::parse(&Value::Map(map)),
            Err(EnvelopeError::UnexpectedKey("type".into()))
        );

        let mut map = Map::new();
        map.insert("type".into(), Value::from("Node"));
        map.insert("id".into(), Value::Int(0));
        assert_eq!(
            Envelope::parse(&Value::Map(map.clone())),
            Err(EnvelopeError::MissingKey("fields"))
        );

        map.insert("fields".into(), Value::Int(0));
        assert!(matches!(
            Envelope::parse(&Value::Map(map)),
            Err(EnvelopeError::InvalidKey { key: "fields", .. })
        ));
    }
}
