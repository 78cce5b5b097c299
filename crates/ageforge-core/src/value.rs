//! Member values held by domain objects.
//!
//! A [`Value`] is the restructured, owned form of a raw record member. It
//! differs from the decoder's raw tree in one way: list-of-record members
//! addressed by a sub-type identifier may be turned into [`Value::Keyed`]
//! containers so later stages look entries up by key instead of position.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Member name to value mapping of a single domain object.
pub type Members = BTreeMap<String, Value>;

/// A member value of a domain object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Record(Members),
    /// Entries of a heterogeneous list keyed by one of their fields.
    Keyed(BTreeMap<i64, Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Members> {
        match self {
            Value::Record(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&BTreeMap<i64, Value>> {
        match self {
            Value::Keyed(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a field when this value is a record.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_record().and_then(|r| r.get(name))
    }

    /// Integer field of a record value.
    pub fn int_field(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(Value::as_int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_accessors() {
        assert_eq!(Value::Int(5).as_int(), Some(5));
        assert_eq!(Value::Bool(true).as_int(), Some(1));
        assert_eq!(Value::Text("x".into()).as_int(), None);
        assert_eq!(Value::Int(2).as_float(), Some(2.0));
    }

    #[test]
    fn record_field_lookup() {
        let mut members = Members::new();
        members.insert("amount".into(), Value::Int(5));
        let record = Value::Record(members);
        assert_eq!(record.int_field("amount"), Some(5));
        assert_eq!(record.int_field("missing"), None);
        assert_eq!(Value::Int(1).field("amount"), None);
    }
}
