//! Capability interface over externally decoded records.
//!
//! The extractor never assumes a concrete schema. It only needs to look up
//! members by name, index into lists, pull out a plain value and view a list
//! of records as a container keyed by one of their fields. [`RawRecord`]
//! captures exactly that; [`RawValue`] is the in-tree implementation, which
//! deserializes from any serde format the data loader understands.

use crate::value::{Members, Value};
use serde::Deserialize;
use std::collections::BTreeMap;

/// What the extractor needs from a decoded record source.
pub trait RawRecord {
    /// Attribute lookup by member name. `None` if absent or not a record.
    fn member(&self, name: &str) -> Option<&Self>;

    /// Element of a list-like record.
    fn at(&self, index: usize) -> Option<&Self>;

    /// Number of elements of a list-like record, `0` for anything else.
    fn len(&self) -> usize;

    /// Extract the raw value of this record as an owned [`Value`].
    fn to_value(&self) -> Value;

    /// Container view: key every element of this list by its `key_field`.
    ///
    /// Elements lacking an integer `key_field` are left out. Returns `None`
    /// when this record is not a list.
    fn to_keyed(&self, key_field: &str) -> Option<Value>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the elements of a list-like record in order.
    fn elements(&self) -> impl Iterator<Item = &Self> {
        (0..self.len()).filter_map(move |i| self.at(i))
    }

    /// Integer member shortcut.
    fn int(&self, name: &str) -> Option<i64> {
        self.member(name).and_then(|m| m.to_value().as_int())
    }

    /// Text member shortcut.
    fn text(&self, name: &str) -> Option<String> {
        match self.member(name)?.to_value() {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A decoded record tree, as produced by an external decoder and stored in
/// RON/JSON/TOML data files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<RawValue>),
    Record(BTreeMap<String, RawValue>),
}

impl RawRecord for RawValue {
    fn member(&self, name: &str) -> Option<&Self> {
        match self {
            RawValue::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    fn at(&self, index: usize) -> Option<&Self> {
        match self {
            RawValue::List(items) => items.get(index),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        match self {
            RawValue::List(items) => items.len(),
            _ => 0,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Int(v) => Value::Int(*v),
            RawValue::Float(v) => Value::Float(*v),
            RawValue::Text(s) => Value::Text(s.clone()),
            RawValue::List(items) => Value::List(items.iter().map(RawValue::to_value).collect()),
            RawValue::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect::<Members>(),
            ),
        }
    }

    fn to_keyed(&self, key_field: &str) -> Option<Value> {
        let RawValue::List(items) = self else {
            return None;
        };
        let keyed = items
            .iter()
            .filter_map(|item| Some((item.int(key_field)?, item.to_value())))
            .collect::<BTreeMap<_, _>>();
        Some(Value::Keyed(keyed))
    }
}
