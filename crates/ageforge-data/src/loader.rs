//! Data file loading: format detection, file discovery and deserialization.
//!
//! A conversion directory holds up to three files, each in RON, JSON or
//! TOML: `config` (optional), `names` and `gamedata`. The decoded game data
//! is read as a [`RawValue`] tree and handed to the extractor unchanged.

use crate::schema::{ConvertConfig, NameTableFile};
use ageforge_core::lookup::{GameVersion, NameTables};
use ageforge_core::raw::RawValue;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Base name of the conversion settings file.
pub const CONFIG_FILE: &str = "config";
/// Base name of the name tables file.
pub const NAMES_FILE: &str = "names";
/// Base name of the decoded game data file.
pub const GAMEDATA_FILE: &str = "gamedata";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The same id appears twice in one name table.
    #[error("duplicate {kind} id {id} in {file}")]
    DuplicateId {
        file: PathBuf,
        kind: &'static str,
        id: u32,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats and discovery
// ===========================================================================

/// Supported data file formats, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Format of a file, from its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|f| ext == Some(f.extension()))
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

/// The `{base_name}.{ron,toml,json}` file in `dir`, if there is exactly
/// one. Two or more formats side by side are an error.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|f| dir.join(format!("{base_name}.{}", f.extension())))
        .filter(|candidate| candidate.exists());
    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (first, _) => Ok(first),
    }
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// Read `path` and deserialize it in the format its extension names.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content).map_err(|detail| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

// ===========================================================================
// Conversion inputs
// ===========================================================================

/// Load the conversion settings, falling back to defaults when the
/// directory has no config file.
pub fn load_config(dir: &Path) -> Result<ConvertConfig, DataLoadError> {
    match find_data_file(dir, CONFIG_FILE)? {
        Some(path) => deserialize_file(&path),
        None => {
            tracing::debug!(dir = %dir.display(), "no config file, using defaults");
            Ok(ConvertConfig::default())
        }
    }
}

fn check_unique(
    seen: &mut HashSet<u32>,
    id: u32,
    kind: &'static str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(DataLoadError::DuplicateId {
            file: file.to_path_buf(),
            kind,
            id,
        })
    }
}

/// Load the name tables of `version`. Several tables for the same version
/// are merged in file order, later entries winning.
pub fn load_name_tables(dir: &Path, version: GameVersion) -> Result<NameTables, DataLoadError> {
    let path = require_data_file(dir, NAMES_FILE)?;
    let tables = deserialize_file::<NameTableFile>(&path)?.into_list();

    let mut merged = NameTables::new();
    for table in tables.into_iter().filter(|t| t.game_version == version) {
        let mut techs = HashSet::new();
        for entry in &table.techs {
            check_unique(&mut techs, entry.id, "tech", &path)?;
        }
        let mut civs = HashSet::new();
        for entry in &table.civs {
            check_unique(&mut civs, entry.id, "civ", &path)?;
        }
        merged.merge(table.into_tables());
    }

    if merged.tech_count() == 0 && merged.civ_count() == 0 {
        tracing::warn!(?version, file = %path.display(), "no name table entries for game version");
    }
    Ok(merged)
}

/// Load the decoded game data root record.
pub fn load_gamedata(dir: &Path) -> Result<RawValue, DataLoadError> {
    let path = require_data_file(dir, GAMEDATA_FILE)?;
    deserialize_file(&path)
}

// ===========================================================================
// Tests
// ===========================================================================
