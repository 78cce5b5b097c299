//! Builder for target-model objects prior to emission.

use crate::forward_ref::{ForwardRef, Location};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target type every patch wrapper inherits from.
pub const PATCH_TYPE: &str = "engine.aux.patch.Patch";

/// Target type of a patch that modifies members of another object.
pub const NYAN_PATCH_TYPE: &str = "engine.aux.patch.NyanPatch";

/// How a patch member combines with the patched member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// A member value of a Raw API Object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Reference to a target API type by its full name.
    ApiRef(String),
    /// Reference to another Raw API Object, resolved at emission.
    Ref(ForwardRef),
    List(Vec<MemberValue>),
}

impl MemberValue {
    /// Every forward reference contained in this value, depth first.
    pub fn forward_refs(&self) -> Vec<&ForwardRef> {
        match self {
            MemberValue::Ref(r) => vec![r],
            MemberValue::List(items) => items.iter().flat_map(MemberValue::forward_refs).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<ForwardRef> for MemberValue {
    fn from(r: ForwardRef) -> Self {
        MemberValue::Ref(r)
    }
}

impl From<Vec<ForwardRef>> for MemberValue {
    fn from(refs: Vec<ForwardRef>) -> Self {
        MemberValue::List(refs.into_iter().map(MemberValue::Ref).collect())
    }
}

/// A member set on a Raw API Object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    pub value: MemberValue,
    /// The API type that declares the member.
    pub origin: String,
    /// Set only for patch members.
    pub operator: Option<MemberOperator>,
}

/// Accumulates parents, members and patch target of one target object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawApiObject {
    reference: String,
    name: String,
    location: Location,
    parents: Vec<String>,
    members: BTreeMap<String, RawMember>,
    patch_target: Option<ForwardRef>,
}

impl RawApiObject {
    /// `reference` identifies the object within its owner group, `name` is
    /// its display name inside its location.
    pub fn new(reference: impl Into<String>, name: impl Into<String>, location: Location) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            location,
            parents: Vec::new(),
            members: BTreeMap::new(),
            patch_target: None,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Parent types in precedence order.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn members(&self) -> &BTreeMap<String, RawMember> {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&RawMember> {
        self.members.get(name)
    }

    pub fn patch_target(&self) -> Option<&ForwardRef> {
        self.patch_target.as_ref()
    }

    pub fn is_patch(&self) -> bool {
        self.patch_target.is_some()
    }

    /// Append a parent type. Parents already present keep their position.
    pub fn add_raw_parent(&mut self, parent: impl Into<String>) {
        let parent = parent.into();
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }

    pub fn add_raw_member(
        &mut self,
        name: impl Into<String>,
        value: impl Into<MemberValue>,
        origin: impl Into<String>,
    ) {
        self.members.insert(
            name.into(),
            RawMember {
                value: value.into(),
                origin: origin.into(),
                operator: None,
            },
        );
    }

    pub fn add_raw_patch_member(
        &mut self,
        name: impl Into<String>,
        value: impl Into<MemberValue>,
        origin: impl Into<String>,
        operator: MemberOperator,
    ) {
        self.members.insert(
            name.into(),
            RawMember {
                value: value.into(),
                origin: origin.into(),
                operator: Some(operator),
            },
        );
    }

    pub fn set_patch_target(&mut self, target: ForwardRef) {
        self.patch_target = Some(target);
    }

    /// Every forward reference this object depends on: location, patch
    /// target and member values.
    pub fn forward_refs(&self) -> Vec<&ForwardRef> {
        let mut refs = Vec::new();
        if let Location::Nested(r) = &self.location {
            refs.push(r);
        }
        refs.extend(self.patch_target.iter());
        for member in self.members.values() {
            refs.extend(member.value.forward_refs());
        }
        refs
    }
}
