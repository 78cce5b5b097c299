//! Grouping pass: civ groups from extracted civs and techs.
//!
//! Runs after extraction, once every tech and civ exists. A civ bonus is a
//! tech no building can research, bound to one civ, with an effect bundle.
//! A researchable tech bound to one civ is that civ's unique tech.

use ageforge_core::container::{ContainerError, ObjectContainer};
use ageforge_core::group::{CivBonus, CivGroup};
use ageforge_core::id::CivId;
use std::collections::BTreeMap;

/// Build and register one [`CivGroup`] per extracted civ. Returns the
/// number of groups created.
pub fn build_civ_groups(data: &mut ObjectContainer) -> Result<usize, ContainerError> {
    let mut groups: BTreeMap<CivId, CivGroup> = data
        .civs()
        .map(|civ| {
            let mut group = CivGroup::new(civ.id);
            group.team_bonus = civ.team_bonus_id();
            group.tech_tree = civ.tech_tree_id();
            (civ.id, group)
        })
        .collect();

    let mut unique_techs = 0;
    for tech in data.techs().filter(|t| t.is_researchable()) {
        let Some(civ) = tech.civ_id() else {
            continue;
        };
        if let Some(group) = groups.get_mut(&civ) {
            group.unique_techs.insert(tech.id);
            unique_techs += 1;
        }
    }

    let mut boni = 0;
    for tech in data.techs().filter(|t| !t.is_researchable()) {
        let Some(bonus) = CivBonus::from_tech(tech) else {
            continue;
        };
        match groups.get_mut(&bonus.civ) {
            Some(group) => {
                group.civ_boni.insert(bonus.tech, bonus);
                boni += 1;
            }
            None => {
                tracing::debug!(tech_id = tech.id.0, civ_id = bonus.civ.0, "civ bonus of unknown civ skipped");
            }
        }
    }

    let count = groups.len();
    for group in groups.into_values() {
        data.insert_civ_group(group)?;
    }
    tracing::info!(civ_groups = count, civ_boni = boni, unique_techs, "grouping finished");
    Ok(count)
}
