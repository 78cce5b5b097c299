//! Civilization setup: unique units and techs, tech tree, civ bonuses
//! and team bonus.
//!
//! Civ bonuses are the decision-heavy part. A bonus either copies a
//! researchable tech, applies from the start, or is unlocked by some
//! prerequisite tech. Unlocked bonuses are attached to that tech: all
//! bonuses landing on the same tech share one wrapper/patch pair whose
//! `updates` list is appended to the tech's own.

use crate::effect::{EffectScope, effect_patches};
use crate::error::SynthesisError;
use crate::objects::{CIV_TYPE, TECH_TYPE, civ_ref, tech_ref, unit_reference};
use crate::patch::{PatchMember, register_patch};
use ageforge_core::api_object::MemberOperator;
use ageforge_core::container::ObjectContainer;
use ageforge_core::forward_ref::ForwardRef;
use ageforge_core::group::CivBonus;
use ageforge_core::id::*;
use ageforge_core::lookup::NameTables;
use ageforge_core::object::EffectKind;
use std::collections::BTreeSet;

/// Id of the game's initial era. It has no tech of its own in the target
/// model, so bonuses gated on it apply from the start.
pub const INITIAL_ERA_TECH_ID: TechId = TechId(104);

/// Why a bonus could not be attached anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The selected prerequisite slot is empty.
    NoPrerequisiteSlot,
    UnknownTech(TechId),
    NotResearchable(TechId),
    /// More than two prerequisites; such bonuses are unlocked by other means.
    TooManyPrerequisites(usize),
}

/// Where a civ bonus ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusPlacement {
    /// The bonus is the civ's copy of a researchable tech.
    DirectReplace(TechId),
    /// No prerequisites; applied with the civ setup.
    Unconditional,
    /// Gated on the initial era; applied with the civ setup.
    InitialEra,
    /// Attached to the given researchable tech.
    Gated(TechId),
    Skipped(SkipReason),
}

/// Decide where `bonus` goes. Pure; registers nothing.
///
/// With two prerequisites the second one is preferred, since it is usually
/// the age-up that unlocks the bonus. The first one is used if the second
/// is neither researchable nor the initial era. The initial era is accepted
/// without any researchability check.
pub fn place_bonus(bonus: &CivBonus, data: &ObjectContainer) -> BonusPlacement {
    if let Some(replaced) = bonus.replaced_tech(data) {
        return BonusPlacement::DirectReplace(replaced);
    }

    let candidate = match bonus.required_tech_count() {
        0 => return BonusPlacement::Unconditional,
        1 => bonus.required_tech(0),
        2 => match bonus.required_tech(1) {
            Some(second) if second == INITIAL_ERA_TECH_ID || data.is_tech_researchable(second) => {
                Some(second)
            }
            _ => bonus.required_tech(0),
        },
        count => return BonusPlacement::Skipped(SkipReason::TooManyPrerequisites(count)),
    };

    let Some(candidate) = candidate else {
        return BonusPlacement::Skipped(SkipReason::NoPrerequisiteSlot);
    };
    if candidate == INITIAL_ERA_TECH_ID {
        return BonusPlacement::InitialEra;
    }
    match data.tech(candidate) {
        None => BonusPlacement::Skipped(SkipReason::UnknownTech(candidate)),
        Some(tech) if !tech.is_researchable() => {
            BonusPlacement::Skipped(SkipReason::NotResearchable(candidate))
        }
        Some(_) => BonusPlacement::Gated(candidate),
    }
}

/// Patches of one candidate tech, in bonus order.
struct GatedPatches {
    tech: TechId,
    target: ForwardRef,
    target_name: String,
    updates: Vec<ForwardRef>,
}

/// One `{Unit}{id}UniqueUnit` patch per unit, adding it to the civ's
/// `unique_units`.
fn setup_unique_units(
    data: &mut ObjectContainer,
    names: &NameTables,
    civ: CivId,
    civ_name: &str,
    units: &[UnitId],
) -> Result<Vec<ForwardRef>, SynthesisError> {
    let owner = GroupRef::Civ(civ);
    let mut patches = Vec::new();
    for &id in units {
        let Some(reference) = data.unit(id).map(unit_reference) else {
            continue;
        };
        let stem = format!("{reference}{}UniqueUnit", id.0);
        let wrapper = register_patch(
            data,
            owner,
            civ_name,
            &stem,
            civ_ref(names, civ)?,
            vec![PatchMember::new(
                "unique_units",
                vec![ForwardRef::new(GroupRef::Unit(id), reference)],
                CIV_TYPE,
                MemberOperator::Add,
            )],
        )?;
        patches.push(wrapper);
    }
    Ok(patches)
}

/// One `{Tech}CivUnique` patch per tech, adding it to the civ's
/// `unique_techs`. Techs without a main object are skipped.
fn setup_unique_techs(
    data: &mut ObjectContainer,
    names: &NameTables,
    civ: CivId,
    civ_name: &str,
    techs: impl IntoIterator<Item = TechId>,
) -> Result<Vec<ForwardRef>, SynthesisError> {
    let owner = GroupRef::Civ(civ);
    let mut patches = Vec::new();
    for tech in techs {
        let Some(tech_target) = tech_ref(data, names, tech) else {
            tracing::debug!(civ = civ.0, tech = tech.0, "unique tech has no main object, skipped");
            continue;
        };
        let stem = format!("{}CivUnique", tech_target.target);
        let wrapper = register_patch(
            data,
            owner,
            civ_name,
            &stem,
            civ_ref(names, civ)?,
            vec![PatchMember::new(
                "unique_techs",
                vec![tech_target],
                CIV_TYPE,
                MemberOperator::Add,
            )],
        )?;
        patches.push(wrapper);
    }
    Ok(patches)
}

/// Bonus patches of a civ. A bonus copying a researchable tech makes that
/// tech unique to the civ, unless it already is one of `unique_techs`.
fn setup_civ_bonus(
    data: &mut ObjectContainer,
    names: &NameTables,
    civ: CivId,
    civ_name: &str,
    boni: &[CivBonus],
    unique_techs: &BTreeSet<TechId>,
) -> Result<Vec<ForwardRef>, SynthesisError> {
    let owner = GroupRef::Civ(civ);
    let mut patches = Vec::new();
    let mut gated: Vec<GatedPatches> = Vec::new();
    let mut replaced: Vec<TechId> = Vec::new();

    for bonus in boni {
        let placement = place_bonus(bonus, data);
        tracing::debug!(civ = civ.0, tech = bonus.tech.0, ?placement, "civ bonus placed");

        // Resolve the attachment point before anything is registered, so a
        // bonus that ends up nowhere leaves no objects behind.
        let gate = match placement {
            BonusPlacement::DirectReplace(tech) => {
                if !unique_techs.contains(&tech) && !replaced.contains(&tech) {
                    replaced.push(tech);
                }
                continue;
            }
            BonusPlacement::Skipped(reason) => {
                tracing::debug!(
                    civ = civ.0,
                    tech = bonus.tech.0,
                    ?reason,
                    "civ bonus unlocked by something else, skipped"
                );
                continue;
            }
            BonusPlacement::Gated(tech) => {
                let Some(entry) = names.tech(tech) else {
                    tracing::warn!(civ = civ.0, tech = tech.0, "gating tech has no name, civ bonus skipped");
                    continue;
                };
                Some((tech, entry.name.clone()))
            }
            BonusPlacement::Unconditional | BonusPlacement::InitialEra => None,
        };

        let prefix = format!("Bonus{}", bonus.tech.0);
        let scope = EffectScope {
            owner,
            parent: civ_name,
            prefix: &prefix,
        };
        let effects = bonus.effects(data);
        let bonus_patches = effect_patches(data, names, &scope, &effects)?;
        if bonus_patches.is_empty() {
            continue;
        }

        match gate {
            None => patches.extend(bonus_patches),
            Some((tech, target_name)) => match gated.iter_mut().find(|g| g.tech == tech) {
                Some(group) => group.updates.extend(bonus_patches),
                None => gated.push(GatedPatches {
                    tech,
                    target: ForwardRef::new(GroupRef::Tech(tech), target_name.clone()),
                    target_name,
                    updates: bonus_patches,
                }),
            },
        }
    }

    for group in gated {
        let stem = format!("{}CivBonus", group.target_name);
        let wrapper = register_patch(
            data,
            owner,
            civ_name,
            &stem,
            group.target,
            vec![PatchMember::new(
                "updates",
                group.updates,
                TECH_TYPE,
                MemberOperator::Add,
            )],
        )?;
        patches.push(wrapper);
    }

    patches.extend(setup_unique_techs(data, names, civ, civ_name, replaced)?);

    Ok(patches)
}

/// Build every setup patch of a civilization and return the wrapper
/// references in setup order: unique units, unique techs, tech tree, civ
/// bonuses, team bonus.
///
/// The civ group must exist and the civ must have a name table entry.
pub fn civ_setup(
    data: &mut ObjectContainer,
    names: &NameTables,
    civ: CivId,
) -> Result<Vec<ForwardRef>, SynthesisError> {
    let group = data
        .civ_group(civ)
        .cloned()
        .ok_or(SynthesisError::MissingCivGroup(civ))?;
    let civ_name = names
        .civ(civ)
        .map(|entry| entry.name.clone())
        .ok_or(SynthesisError::MissingCivName(civ))?;
    let owner = group.owner();
    let mut patches = Vec::new();

    let units = group.enabled_units(data);
    patches.extend(setup_unique_units(data, names, civ, &civ_name, &units)?);
    patches.extend(setup_unique_techs(
        data,
        names,
        civ,
        &civ_name,
        group.unique_techs.iter().copied(),
    )?);

    let tech_tree: Vec<_> = group
        .tech_tree_effects(data)
        .into_iter()
        .filter(|e| e.kind == EffectKind::DisableTech)
        .collect();
    let scope = EffectScope {
        owner,
        parent: &civ_name,
        prefix: "TechTree",
    };
    patches.extend(effect_patches(data, names, &scope, &tech_tree)?);

    let boni: Vec<CivBonus> = group.civ_boni.values().cloned().collect();
    patches.extend(setup_civ_bonus(
        data,
        names,
        civ,
        &civ_name,
        &boni,
        &group.unique_techs,
    )?);

    let team_bonus = group.team_bonus_effects(data);
    if !team_bonus.is_empty() {
        let scope = EffectScope {
            owner,
            parent: &civ_name,
            prefix: "TeamBonus",
        };
        patches.extend(effect_patches(data, names, &scope, &team_bonus)?);
    }

    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ageforge_core::api_object::MemberValue;
    use ageforge_core::group::CivGroup;
    use ageforge_core::lookup::NameEntry;
    use ageforge_core::object::{EffectBundle, UnitObject};
    use ageforge_core::raw::{RawRecord, RawValue};
    use ageforge_core::test_utils::*;
    use ageforge_core::value::{Members, Value};

    const FEUDAL: u32 = 101;
    const CASTLE: u32 = 102;
    const HIDDEN: u32 = 103;

    fn bundle(id: u32, effects: Vec<RawValue>) -> EffectBundle {
        let raw = raw_effect_bundle("bundle", effects).to_value();
        let members = match raw {
            Value::Record(m) => m,
            _ => Members::new(),
        };
        EffectBundle::new(EffectBundleId(id), members)
    }

    fn hp_bonus(value: f64) -> RawValue {
        raw_effect(4, 4, -1, 0, value)
    }

    /// Ages 101 and 102 are researchable, 103 exists but is hidden. Unit 4
    /// exists so attribute bonuses produce patches.
    fn dataset() -> (ObjectContainer, NameTables) {
        let mut data = ObjectContainer::default();
        data.insert_tech(tech_object(FEUDAL, TechSpec::researchable(-1))).unwrap();
        data.insert_tech(tech_object(CASTLE, TechSpec::researchable(-1))).unwrap();
        data.insert_tech(tech_object(HIDDEN, TechSpec::hidden(-1))).unwrap();
        let mut members = Members::new();
        members.insert("name".into(), Value::Text("Archer".into()));
        data.insert_unit(UnitObject::new(UnitId(4), members)).unwrap();

        let mut names = NameTables::new();
        names.insert_civ(CivId(1), NameEntry::new("Britons", "britons"));
        names.insert_tech(TechId(FEUDAL), NameEntry::new("FeudalAge", "feudal_age"));
        names.insert_tech(TechId(CASTLE), NameEntry::new("CastleAge", "castle_age"));
        names.insert_tech(TechId(HIDDEN), NameEntry::new("Hidden", "hidden"));
        (data, names)
    }

    /// Register a bonus tech with its own bundle and return its view.
    fn add_bonus(data: &mut ObjectContainer, tech: u32, bundle_id: u32, spec: TechSpec) -> CivBonus {
        data.insert_effect_bundle(bundle(bundle_id, vec![hp_bonus(f64::from(tech))]))
            .unwrap();
        let object = tech_object(tech, spec);
        let bonus = CivBonus::from_tech(&object).unwrap();
        data.insert_tech(object).unwrap();
        bonus
    }

    fn civ_group(data: &mut ObjectContainer, boni: &[CivBonus]) {
        let mut group = CivGroup::new(CivId(1));
        for bonus in boni {
            group.civ_boni.insert(bonus.tech, bonus.clone());
        }
        data.insert_civ_group(group).unwrap();
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    #[test]
    fn no_prerequisites_is_unconditional() {
        let (mut data, _) = dataset();
        let bonus = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600));
        assert_eq!(place_bonus(&bonus, &data), BonusPlacement::Unconditional);
    }

    #[test]
    fn single_prerequisite_is_candidate() {
        let (mut data, _) = dataset();
        let bonus = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[101]));
        assert_eq!(place_bonus(&bonus, &data), BonusPlacement::Gated(TechId(FEUDAL)));
    }

    #[test]
    fn second_prerequisite_preferred() {
        let (mut data, _) = dataset();
        let bonus = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[101, 102]));
        assert_eq!(place_bonus(&bonus, &data), BonusPlacement::Gated(TechId(CASTLE)));
    }

    #[test]
    fn falls_back_to_first_when_second_not_researchable() {
        let (mut data, _) = dataset();
        let hidden_second =
            add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[101, 103]));
        let unknown_second =
            add_bonus(&mut data, 501, 601, TechSpec::bonus(1, 601).requires(&[102, 999]));
        assert_eq!(place_bonus(&hidden_second, &data), BonusPlacement::Gated(TechId(FEUDAL)));
        assert_eq!(place_bonus(&unknown_second, &data), BonusPlacement::Gated(TechId(CASTLE)));
    }

    #[test]
    fn fallback_to_unusable_first_is_skipped() {
        let (mut data, _) = dataset();
        let bonus = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[103, 103]));
        assert_eq!(
            place_bonus(&bonus, &data),
            BonusPlacement::Skipped(SkipReason::NotResearchable(TechId(HIDDEN)))
        );
        let unknown = add_bonus(&mut data, 501, 601, TechSpec::bonus(1, 601).requires(&[777]));
        assert_eq!(
            place_bonus(&unknown, &data),
            BonusPlacement::Skipped(SkipReason::UnknownTech(TechId(777)))
        );
    }

    #[test]
    fn initial_era_is_always_eligible() {
        let (mut data, _) = dataset();
        assert!(data.tech(INITIAL_ERA_TECH_ID).is_none());
        let only_era = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[104]));
        let era_second = add_bonus(&mut data, 501, 601, TechSpec::bonus(1, 601).requires(&[103, 104]));
        assert_eq!(place_bonus(&only_era, &data), BonusPlacement::InitialEra);
        assert_eq!(place_bonus(&era_second, &data), BonusPlacement::InitialEra);
    }

    #[test]
    fn initial_era_wins_over_researchability_check() {
        // Even a (bogus) hidden tech registered under the era id does not
        // turn the bonus into a skip.
        let (mut data, _) = dataset();
        data.insert_tech(tech_object(104, TechSpec::hidden(-1))).unwrap();
        let bonus = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[104]));
        assert_eq!(place_bonus(&bonus, &data), BonusPlacement::InitialEra);
    }

    #[test]
    fn many_prerequisites_are_skipped() {
        let (mut data, _) = dataset();
        let bonus =
            add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[101, 102, 101]));
        assert_eq!(
            place_bonus(&bonus, &data),
            BonusPlacement::Skipped(SkipReason::TooManyPrerequisites(3))
        );
        let empty = add_bonus(&mut data, 501, 601, TechSpec::bonus(1, 601).count(1));
        assert_eq!(
            place_bonus(&empty, &data),
            BonusPlacement::Skipped(SkipReason::NoPrerequisiteSlot)
        );
    }

    #[test]
    fn copy_of_researchable_tech_is_direct_replace() {
        let (mut data, _) = dataset();
        data.insert_effect_bundle(bundle(700, vec![hp_bonus(1.0)])).unwrap();
        data.insert_tech(tech_object(200, TechSpec::researchable(700))).unwrap();
        let object = tech_object(500, TechSpec::bonus(1, 700).requires(&[101]));
        let bonus = CivBonus::from_tech(&object).unwrap();
        assert_eq!(place_bonus(&bonus, &data), BonusPlacement::DirectReplace(TechId(200)));
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    #[test]
    fn boni_on_same_tech_share_one_patch() {
        let (mut data, names) = dataset();
        let a = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[101]));
        let b = add_bonus(&mut data, 501, 601, TechSpec::bonus(1, 601).requires(&[103, 101]));
        civ_group(&mut data, &[a, b]);

        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        let owner = GroupRef::Civ(CivId(1));
        assert_eq!(
            patches,
            vec![ForwardRef::new(owner, "Britons.FeudalAgeCivBonusWrapper")]
        );

        let patch = data
            .resolve_ref(&ForwardRef::new(
                owner,
                "Britons.FeudalAgeCivBonusWrapper.FeudalAgeCivBonus",
            ))
            .unwrap();
        assert_eq!(
            patch.patch_target(),
            Some(&ForwardRef::new(GroupRef::Tech(TechId(FEUDAL)), "FeudalAge"))
        );
        let updates = patch.member("updates").unwrap();
        assert_eq!(updates.operator, Some(MemberOperator::Add));
        assert_eq!(
            updates.value,
            MemberValue::from(vec![
                ForwardRef::new(owner, "Britons.Bonus500AttributeAdd0Wrapper"),
                ForwardRef::new(owner, "Britons.Bonus501AttributeAdd0Wrapper"),
            ])
        );
    }

    #[test]
    fn skipped_bonus_registers_nothing() {
        let (mut data, names) = dataset();
        let skipped = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[103]));
        civ_group(&mut data, &[skipped]);
        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        assert!(patches.is_empty());
        assert_eq!(data.api_object_count(), 0);
    }

    #[test]
    fn era_and_unconditional_boni_join_setup_directly() {
        let (mut data, names) = dataset();
        let era = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600).requires(&[104]));
        let free = add_bonus(&mut data, 501, 601, TechSpec::bonus(1, 601));
        civ_group(&mut data, &[era, free]);
        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        let targets: Vec<&str> = patches.iter().map(|p| p.target.as_str()).collect();
        assert_eq!(
            targets,
            ["Britons.Bonus500AttributeAdd0Wrapper", "Britons.Bonus501AttributeAdd0Wrapper"]
        );
    }

    #[test]
    fn setup_order_is_tech_tree_bonus_team_bonus() {
        let (mut data, names) = dataset();
        data.insert_effect_bundle(bundle(10, vec![raw_effect(102, -1, -1, -1, 102.0), hp_bonus(1.0)]))
            .unwrap();
        data.insert_effect_bundle(bundle(11, vec![raw_effect(1, 0, 1, -1, 50.0)]))
            .unwrap();
        let bonus = add_bonus(&mut data, 500, 600, TechSpec::bonus(1, 600));
        let mut group = CivGroup::new(CivId(1));
        group.civ_boni.insert(bonus.tech, bonus);
        group.tech_tree = Some(EffectBundleId(10));
        group.team_bonus = Some(EffectBundleId(11));
        data.insert_civ_group(group).unwrap();

        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        let targets: Vec<&str> = patches.iter().map(|p| p.target.as_str()).collect();
        assert_eq!(
            targets,
            [
                "Britons.TechTreeDisableTech0Wrapper",
                "Britons.Bonus500AttributeAdd0Wrapper",
                "Britons.TeamBonusResourceModify0Wrapper",
            ]
        );
    }

    #[test]
    fn direct_replace_adds_tech_to_civ() {
        let (mut data, names) = dataset();
        data.insert_effect_bundle(bundle(700, vec![hp_bonus(1.0)])).unwrap();
        data.insert_tech(tech_object(FEUDAL + 100, TechSpec::researchable(700)))
            .unwrap();
        let mut names = names;
        names.insert_tech(TechId(FEUDAL + 100), NameEntry::new("Yeomen", "yeomen"));
        let copy = CivBonus::from_tech(&tech_object(500, TechSpec::bonus(1, 700))).unwrap();
        civ_group(&mut data, &[copy]);

        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        assert_eq!(patches.len(), 1);
        let patch = data
            .resolve_ref(&ForwardRef::new(
                GroupRef::Civ(CivId(1)),
                "Britons.YeomenCivUniqueWrapper.YeomenCivUnique",
            ))
            .unwrap();
        assert_eq!(
            patch.patch_target(),
            Some(&ForwardRef::new(GroupRef::Civ(CivId(1)), "Britons"))
        );
        assert!(patch.member("unique_techs").is_some());
    }

    #[test]
    fn unique_units_and_techs_lead_setup() {
        let (mut data, mut names) = dataset();
        // Yeomen: researchable, Britons only, enables the archer.
        data.insert_effect_bundle(bundle(700, vec![raw_effect(2, 4, 1, -1, 0.0)]))
            .unwrap();
        data.insert_tech(tech_object(300, TechSpec::researchable(700).for_civ(1)))
            .unwrap();
        names.insert_tech(TechId(300), NameEntry::new("Yeomen", "yeomen"));
        data.insert_effect_bundle(bundle(10, vec![raw_effect(102, -1, -1, -1, 102.0)]))
            .unwrap();
        let mut group = CivGroup::new(CivId(1));
        group.unique_techs.insert(TechId(300));
        group.tech_tree = Some(EffectBundleId(10));
        data.insert_civ_group(group).unwrap();

        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        let targets: Vec<&str> = patches.iter().map(|p| p.target.as_str()).collect();
        assert_eq!(
            targets,
            [
                "Britons.Archer4UniqueUnitWrapper",
                "Britons.YeomenCivUniqueWrapper",
                "Britons.TechTreeDisableTech0Wrapper",
            ]
        );

        let owner = GroupRef::Civ(CivId(1));
        let unit_patch = data
            .resolve_ref(&ForwardRef::new(
                owner,
                "Britons.Archer4UniqueUnitWrapper.Archer4UniqueUnit",
            ))
            .unwrap();
        assert_eq!(unit_patch.patch_target(), Some(&ForwardRef::new(owner, "Britons")));
        let member = unit_patch.member("unique_units").unwrap();
        assert_eq!(member.operator, Some(MemberOperator::Add));
        assert_eq!(
            member.value,
            MemberValue::from(vec![ForwardRef::new(GroupRef::Unit(UnitId(4)), "Archer")])
        );

        let tech_patch = data
            .resolve_ref(&ForwardRef::new(owner, "Britons.YeomenCivUniqueWrapper.YeomenCivUnique"))
            .unwrap();
        assert_eq!(
            tech_patch.member("unique_techs").unwrap().value,
            MemberValue::from(vec![ForwardRef::new(GroupRef::Tech(TechId(300)), "Yeomen")])
        );
    }

    #[test]
    fn unique_tech_without_main_object_is_skipped() {
        let (mut data, mut names) = dataset();
        data.insert_tech(tech_object(300, TechSpec::researchable(-1).for_civ(1)))
            .unwrap();
        // Named but never extracted.
        names.insert_tech(TechId(301), NameEntry::new("Chemistry", "chemistry"));
        let mut group = CivGroup::new(CivId(1));
        group.unique_techs.extend([TechId(300), TechId(301)]);
        data.insert_civ_group(group).unwrap();

        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        assert!(patches.is_empty());
        assert_eq!(data.api_object_count(), 0);
    }

    #[test]
    fn copy_of_unique_tech_adds_it_once() {
        let (mut data, mut names) = dataset();
        data.insert_effect_bundle(bundle(700, vec![hp_bonus(1.0)])).unwrap();
        data.insert_tech(tech_object(300, TechSpec::researchable(700).for_civ(1)))
            .unwrap();
        names.insert_tech(TechId(300), NameEntry::new("Yeomen", "yeomen"));
        let copy = CivBonus::from_tech(&tech_object(500, TechSpec::bonus(1, 700))).unwrap();
        let mut group = CivGroup::new(CivId(1));
        group.unique_techs.insert(TechId(300));
        group.civ_boni.insert(copy.tech, copy);
        data.insert_civ_group(group).unwrap();

        let patches = civ_setup(&mut data, &names, CivId(1)).unwrap();
        assert_eq!(
            patches,
            vec![ForwardRef::new(GroupRef::Civ(CivId(1)), "Britons.YeomenCivUniqueWrapper")]
        );
    }

    #[test]
    fn setup_requires_group_and_name() {
        let (mut data, mut names) = dataset();
        assert!(matches!(
            civ_setup(&mut data, &names, CivId(1)),
            Err(SynthesisError::MissingCivGroup(CivId(1)))
        ));
        civ_group(&mut data, &[]);
        names = NameTables::new();
        assert!(matches!(
            civ_setup(&mut data, &names, CivId(1)),
            Err(SynthesisError::MissingCivName(CivId(1)))
        ));
    }
}
