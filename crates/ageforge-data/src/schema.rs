//! Serde data file structs for conversion settings and name tables.
//!
//! These are read with the loader's format detection (RON, JSON or TOML)
//! and turned into the types the conversion stages work with.

use ageforge_core::id::{CivId, TechId};
use ageforge_core::lookup::{GameVersion, NameEntry, NameTables};
use serde::Deserialize;
use std::collections::HashSet;

// ===========================================================================
// Conversion settings
// ===========================================================================

/// Settings of one conversion run. Every field has a default, so an empty
/// file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub game_version: GameVersion,
    /// Index of the civilization whose unit table is read. The neutral
    /// group at index 0 holds every unit.
    pub canonical_civ_index: usize,
    /// Asset filenames known to exist, compared case-insensitively.
    pub existing_graphics: Vec<String>,
    /// First segment of every concrete namespace path.
    pub namespace_root: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            game_version: GameVersion::default(),
            canonical_civ_index: 0,
            existing_graphics: Vec::new(),
            namespace_root: "data".to_string(),
        }
    }
}

impl ConvertConfig {
    /// The known asset filenames, lower-cased.
    pub fn known_graphics(&self) -> HashSet<String> {
        self.existing_graphics
            .iter()
            .map(|f| f.to_lowercase())
            .collect()
    }
}

// ===========================================================================
// Name tables
// ===========================================================================

/// One id to name entry in a name table file.
#[derive(Debug, Clone, Deserialize)]
pub struct NameData {
    pub id: u32,
    pub name: String,
    pub snake: String,
}

/// The name tables of one game version.
#[derive(Debug, Clone, Deserialize)]
pub struct NameTableData {
    pub game_version: GameVersion,
    #[serde(default)]
    pub techs: Vec<NameData>,
    #[serde(default)]
    pub civs: Vec<NameData>,
}

impl NameTableData {
    pub fn into_tables(self) -> NameTables {
        let mut tables = NameTables::new();
        for entry in self.techs {
            tables.insert_tech(TechId(entry.id), NameEntry::new(entry.name, entry.snake));
        }
        for entry in self.civs {
            tables.insert_civ(CivId(entry.id), NameEntry::new(entry.name, entry.snake));
        }
        tables
    }
}

/// A name table file: either a bare list of tables, or a record with a
/// `tables` list (the only shape TOML can express).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NameTableFile {
    List(Vec<NameTableData>),
    Keyed { tables: Vec<NameTableData> },
}

impl NameTableFile {
    pub fn into_list(self) -> Vec<NameTableData> {
        match self {
            NameTableFile::List(tables) | NameTableFile::Keyed { tables } => tables,
        }
    }
}
