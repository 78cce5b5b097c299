//! Ageforge Patch -- target-model objects and patches for a dataset.
//!
//! Runs after extraction and grouping. Every unit, named tech and civ group
//! gets a main Raw API Object; effects become wrapper/patch pairs nested
//! under the group that owns them. Civ bonuses are placed onto the tech that
//! unlocks them, see [`civ::place_bonus`].
//!
//! Nothing here resolves references. The container is left ready for
//! [`ageforge_core::link`].

pub mod civ;
pub mod effect;
pub mod error;
pub mod objects;
pub mod patch;

use ageforge_core::container::ObjectContainer;
use ageforge_core::id::CivId;
use ageforge_core::lookup::NameTables;
use error::SynthesisError;

/// Object counts of one synthesis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    pub units: usize,
    pub techs: usize,
    pub civs: usize,
    pub api_objects: usize,
}

/// Create the main objects of all groups and every civ's setup patches.
///
/// Civ groups without a name table entry are left out with a warning.
pub fn synthesize(
    data: &mut ObjectContainer,
    names: &NameTables,
    root: &str,
) -> Result<SynthesisReport, SynthesisError> {
    let units = objects::create_unit_objects(data, root)?;
    let techs = objects::create_tech_objects(data, names, root)?;

    let civ_ids: Vec<CivId> = data.civ_groups().map(|g| g.civ).collect();
    let mut civs = 0;
    for civ in civ_ids {
        if names.civ(civ).is_none() {
            tracing::warn!(civ = civ.0, "civ has no name table entry, not converted");
            continue;
        }
        let setup = civ::civ_setup(data, names, civ)?;
        objects::create_civ_object(data, names, civ, root, setup)?;
        civs += 1;
    }

    let report = SynthesisReport {
        units,
        techs,
        civs,
        api_objects: data.api_object_count(),
    };
    tracing::info!(
        units = report.units,
        techs = report.techs,
        civs = report.civs,
        api_objects = report.api_objects,
        "patch synthesis finished"
    );
    Ok(report)
}
