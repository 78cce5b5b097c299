//! Record extraction: decoded raw records to domain objects.
//!
//! Every category is read into its own partition first and committed to the
//! container afterwards, so the per-category readers never touch shared
//! state. Cross-referencing (sub-graphic detection) runs only after the
//! commit, when every graphic exists.

use ageforge_core::container::{ContainerError, ObjectContainer};
use ageforge_core::id::*;
use ageforge_core::object::*;
use ageforge_core::raw::RawRecord;
use ageforge_core::value::{Members, Value};
use std::collections::HashSet;

/// Member of the root record holding the civilizations. Without it there
/// is no dataset to convert.
pub const CIVS_MEMBER: &str = "civs";

/// Why extraction had to give up on the whole dataset.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("root record has no '{member}' member")]
    MissingRoot { member: &'static str },

    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// Per-category totals of one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub units: usize,
    pub graphics: usize,
    /// Graphic records dropped for having no filename.
    pub skipped_graphics: usize,
    /// Graphics created but flagged as missing from the known assets.
    pub missing_graphics: usize,
    pub techs: usize,
    pub effect_bundles: usize,
    pub civs: usize,
}

fn members_of<R: RawRecord>(record: &R) -> Option<Members> {
    match record.to_value() {
        Value::Record(members) => Some(members),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Per-category readers
// ---------------------------------------------------------------------------

fn extract_units<R: RawRecord>(root: &R, civs: &R, canonical_civ: usize) -> Vec<UnitObject> {
    let Some(units) = civs.at(canonical_civ).and_then(|civ| civ.member("units")) else {
        tracing::warn!(canonical_civ, "canonical civ has no unit table");
        return Vec::new();
    };
    let headers = root.member("unit_headers");

    let mut extracted = Vec::with_capacity(units.len());
    for (index, raw) in units.elements().enumerate() {
        let Some(id) = raw.int("id0").and_then(raw_index) else {
            tracing::debug!(index, "unit record without id skipped");
            continue;
        };
        let Some(mut members) = members_of(raw) else {
            continue;
        };

        // Keyed by damage type, so later stages address entries by type.
        for paired in ["attacks", "armors"] {
            if let Some(keyed) = raw.member(paired).and_then(|m| m.to_keyed("type_id")) {
                members.insert(paired.to_string(), keyed);
            }
        }

        let mut unit = UnitObject::new(UnitId(id), members);
        if !unit.has_member("unit_commands") {
            let commands = headers
                .and_then(|h| h.at(id as usize))
                .and_then(|header| header.member("unit_commands"))
                .map(RawRecord::to_value);
            if let Some(commands) = commands {
                unit.add_member("unit_commands", commands);
            }
        }
        extracted.push(unit);
    }
    extracted
}

/// Graphics plus the number of records dropped for lacking a filename.
fn extract_graphics<R: RawRecord>(root: &R, known: &HashSet<String>) -> (Vec<GraphicObject>, usize) {
    let Some(graphics) = root.member("graphics") else {
        tracing::debug!("dataset has no graphics");
        return (Vec::new(), 0);
    };

    let mut extracted = Vec::with_capacity(graphics.len());
    let mut skipped = 0;
    for raw in graphics.elements() {
        let Some(id) = raw.int("graphic_id").and_then(raw_index) else {
            skipped += 1;
            continue;
        };
        let filename = raw.text("filename").unwrap_or_default().to_lowercase();
        if filename.is_empty() {
            skipped += 1;
            continue;
        }
        let Some(members) = members_of(raw) else {
            skipped += 1;
            continue;
        };

        let mut graphic = GraphicObject::new(GraphicId(id), members);
        if !known.contains(&filename) {
            tracing::debug!(graphic_id = id, %filename, "graphic file not found in assets");
            graphic.exists = false;
        }
        extracted.push(graphic);
    }
    (extracted, skipped)
}

/// Records of a list whose ids are positional.
fn indexed<R: RawRecord>(root: &R, member: &str) -> Vec<(u32, Members)> {
    let Some(list) = root.member(member) else {
        tracing::debug!(member, "dataset has no such list");
        return Vec::new();
    };
    list.elements()
        .enumerate()
        .filter_map(|(index, raw)| {
            let id = u32::try_from(index).ok()?;
            Some((id, members_of(raw)?))
        })
        .collect()
}

fn extract_techs<R: RawRecord>(root: &R) -> Vec<TechObject> {
    indexed(root, "researches")
        .into_iter()
        .map(|(id, members)| TechObject::new(TechId(id), members))
        .collect()
}

fn extract_effect_bundles<R: RawRecord>(root: &R) -> Vec<EffectBundle> {
    indexed(root, "effect_bundles")
        .into_iter()
        .map(|(id, members)| EffectBundle::new(EffectBundleId(id), members))
        .collect()
}

fn extract_civs<R: RawRecord>(civs: &R) -> Vec<CivObject> {
    civs.elements()
        .enumerate()
        .filter_map(|(index, raw)| {
            let mut members = members_of(raw)?;
            // The unit table is read once, from the canonical civ only.
            members.remove("units");
            Some(CivObject::new(CivId(u32::try_from(index).ok()?), members))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Partitions
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Partitions {
    units: Vec<UnitObject>,
    graphics: Vec<GraphicObject>,
    skipped_graphics: usize,
    techs: Vec<TechObject>,
    effect_bundles: Vec<EffectBundle>,
    civs: Vec<CivObject>,
}

#[cfg(not(feature = "parallel"))]
fn read_partitions<R: RawRecord + Sync>(
    root: &R,
    civs: &R,
    known: &HashSet<String>,
    canonical_civ: usize,
) -> Partitions {
    let (graphics, skipped_graphics) = extract_graphics(root, known);
    Partitions {
        units: extract_units(root, civs, canonical_civ),
        graphics,
        skipped_graphics,
        techs: extract_techs(root),
        effect_bundles: extract_effect_bundles(root),
        civs: extract_civs(civs),
    }
}

#[cfg(feature = "parallel")]
fn read_partitions<R: RawRecord + Sync>(
    root: &R,
    civs: &R,
    known: &HashSet<String>,
    canonical_civ: usize,
) -> Partitions {
    let ((units, (graphics, skipped_graphics)), (techs, (effect_bundles, civ_objects))) =
        rayon::join(
            || {
                rayon::join(
                    || extract_units(root, civs, canonical_civ),
                    || extract_graphics(root, known),
                )
            },
            || {
                rayon::join(
                    || extract_techs(root),
                    || rayon::join(|| extract_effect_bundles(root), || extract_civs(civs)),
                )
            },
        );
    Partitions {
        units,
        graphics,
        skipped_graphics,
        techs,
        effect_bundles,
        civs: civ_objects,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Populate `data` from the decoded root record.
///
/// Malformed or irrelevant records are skipped. Fails only if the root has
/// no civilization list, or if an identifier would be assigned twice.
pub fn extract<R: RawRecord + Sync>(
    root: &R,
    data: &mut ObjectContainer,
    canonical_civ: usize,
) -> Result<ExtractReport, ExtractError> {
    let civs = root.member(CIVS_MEMBER).ok_or(ExtractError::MissingRoot {
        member: CIVS_MEMBER,
    })?;

    let parts = read_partitions(root, civs, &data.existing_graphics, canonical_civ);

    let report = ExtractReport {
        units: parts.units.len(),
        graphics: parts.graphics.len(),
        skipped_graphics: parts.skipped_graphics,
        missing_graphics: parts.graphics.iter().filter(|g| !g.exists).count(),
        techs: parts.techs.len(),
        effect_bundles: parts.effect_bundles.len(),
        civs: parts.civs.len(),
    };

    // Commit serially; the container has a single writer.
    for unit in parts.units {
        data.insert_unit(unit)?;
    }
    for graphic in parts.graphics {
        data.insert_graphic(graphic)?;
    }
    for tech in parts.techs {
        data.insert_tech(tech)?;
    }
    for bundle in parts.effect_bundles {
        data.insert_effect_bundle(bundle)?;
    }
    for civ in parts.civs {
        data.insert_civ(civ)?;
    }

    data.detect_subgraphics();

    tracing::info!(
        units = report.units,
        graphics = report.graphics,
        skipped_graphics = report.skipped_graphics,
        missing_graphics = report.missing_graphics,
        techs = report.techs,
        effect_bundles = report.effect_bundles,
        civs = report.civs,
        "extraction finished"
    );
    Ok(report)
}
