use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies a Raw API Object registered in the object container.
    pub struct ApiObjectKey;
}

/// Identifies a unit record. Taken verbatim from the record's `id0` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Identifies a graphic record. Taken from the record's `graphic_id` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphicId(pub u32);

/// Identifies a technology. The position of the record in the `researches` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TechId(pub u32);

/// Identifies an effect bundle. The position of the record in `effect_bundles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectBundleId(pub u32);

/// Identifies a civilization. The position of the record in `civs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CivId(pub u32);

/// Category of a domain object inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Unit,
    Graphic,
    Tech,
    EffectBundle,
    Civ,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Unit => "unit",
            Category::Graphic => "graphic",
            Category::Tech => "tech",
            Category::EffectBundle => "effect bundle",
            Category::Civ => "civ",
        };
        f.write_str(name)
    }
}

/// The owner of a set of Raw API Objects: a conversion group identified by
/// category and id. Owners need not be registered yet when referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupRef {
    Unit(UnitId),
    Tech(TechId),
    Civ(CivId),
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Unit(id) => write!(f, "unit#{}", id.0),
            GroupRef::Tech(id) => write!(f, "tech#{}", id.0),
            GroupRef::Civ(id) => write!(f, "civ#{}", id.0),
        }
    }
}

/// Convert a raw signed identifier into an index, treating negatives
/// (the `-1` "none" sentinel) as absent.
pub fn raw_index(raw: i64) -> Option<u32> {
    u32::try_from(raw).ok()
}
