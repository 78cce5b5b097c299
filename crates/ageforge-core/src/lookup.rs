//! Identifier to name tables for the target namespace.
//!
//! Tables are external, read-only data. Patch synthesis uses them to name
//! the objects it creates after the technology or civilization they belong
//! to.

use crate::id::{CivId, TechId};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Which release of the game a dataset was decoded from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVersion {
    Aok,
    Aoc,
    #[default]
    De2,
}

/// The names of one technology or civilization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameEntry {
    /// CamelCase object name, e.g. `FeudalAge`.
    pub name: String,
    /// snake_case namespace segment, e.g. `feudal_age`.
    pub snake: String,
}

impl NameEntry {
    pub fn new(name: impl Into<String>, snake: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snake: snake.into(),
        }
    }
}

/// Name tables of a single game version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameTables {
    techs: BTreeMap<TechId, NameEntry>,
    civs: BTreeMap<CivId, NameEntry>,
}

impl NameTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tech(&mut self, id: TechId, entry: NameEntry) {
        self.techs.insert(id, entry);
    }

    pub fn insert_civ(&mut self, id: CivId, entry: NameEntry) {
        self.civs.insert(id, entry);
    }

    pub fn tech(&self, id: TechId) -> Option<&NameEntry> {
        self.techs.get(&id)
    }

    pub fn civ(&self, id: CivId) -> Option<&NameEntry> {
        self.civs.get(&id)
    }

    pub fn tech_count(&self) -> usize {
        self.techs.len()
    }

    pub fn civ_count(&self) -> usize {
        self.civs.len()
    }

    /// Overlay `other` on top of these tables; entries in `other` win.
    pub fn merge(&mut self, other: NameTables) {
        self.techs.extend(other.techs);
        self.civs.extend(other.civs);
    }
}

/// Turn a free-form record name into a CamelCase object name.
///
/// Non-alphanumeric characters separate words. Returns `None` if nothing
/// usable remains or the result would start with a digit.
pub fn camel_case(raw: &str) -> Option<String> {
    let name: String = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Some(name),
        _ => None,
    }
}

/// Turn a CamelCase name into its snake_case form.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
