//! Main target objects of techs, civilizations and units.
//!
//! These are the objects patches are nested in and aimed at. Each lives at
//! a concrete namespace path, which is what ultimately anchors every
//! forward reference chain.

use crate::effect::{EffectScope, effect_patches};
use crate::error::SynthesisError;
use ageforge_core::api_object::{MemberValue, RawApiObject};
use ageforge_core::container::ObjectContainer;
use ageforge_core::forward_ref::{ForwardRef, Location};
use ageforge_core::id::*;
use ageforge_core::lookup::{NameTables, camel_case, snake_case};
use ageforge_core::object::{DomainObject, UnitObject};

pub const TECH_TYPE: &str = "engine.aux.tech.Tech";
pub const CIV_TYPE: &str = "engine.aux.civilization.Civilization";
pub const GAME_ENTITY_TYPE: &str = "engine.aux.game_entity.GameEntity";

/// Reference name of a unit's main object, derived from its raw name.
pub fn unit_reference(unit: &UnitObject) -> String {
    unit.name()
        .and_then(camel_case)
        .unwrap_or_else(|| format!("Unit{}", unit.id.0))
}

/// Forward reference to a tech's main object. The tech must be part of
/// the dataset and have a name, otherwise it has no main object.
pub fn tech_ref(data: &ObjectContainer, names: &NameTables, tech: TechId) -> Option<ForwardRef> {
    let entry = names.tech(tech)?;
    if data.tech(tech).is_none() {
        tracing::debug!(tech_id = tech.0, "named tech missing from dataset, not referenced");
        return None;
    }
    Some(ForwardRef::new(GroupRef::Tech(tech), entry.name.clone()))
}

/// Forward reference to a civilization's main object.
pub fn civ_ref(names: &NameTables, civ: CivId) -> Result<ForwardRef, SynthesisError> {
    names
        .civ(civ)
        .map(|entry| ForwardRef::new(GroupRef::Civ(civ), entry.name.clone()))
        .ok_or(SynthesisError::MissingCivName(civ))
}

/// Create the main object of every unit.
pub fn create_unit_objects(data: &mut ObjectContainer, root: &str) -> Result<usize, SynthesisError> {
    let objects: Vec<(UnitId, RawApiObject)> = data
        .units()
        .map(|unit| {
            let reference = unit_reference(unit);
            let path = format!("{root}.unit.{}_{}", snake_case(&reference), unit.id.0);
            let mut object = RawApiObject::new(reference.clone(), reference, Location::Path(path));
            object.add_raw_parent(GAME_ENTITY_TYPE);
            if let Some(name) = unit.name() {
                object.add_raw_member("name", MemberValue::Text(name.to_string()), GAME_ENTITY_TYPE);
            }
            (unit.id, object)
        })
        .collect();

    let count = objects.len();
    for (id, object) in objects {
        data.add_raw_api_object(GroupRef::Unit(id), object)?;
    }
    Ok(count)
}

/// Create the main object of every named tech, together with patches for
/// the tech's own effects (its `updates`).
///
/// Techs missing from the name tables get no object; forward references
/// to them are never created.
pub fn create_tech_objects(
    data: &mut ObjectContainer,
    names: &NameTables,
    root: &str,
) -> Result<usize, SynthesisError> {
    let techs: Vec<(TechId, Vec<_>)> = data
        .techs()
        .map(|t| {
            let effects = t
                .effect_bundle_id()
                .and_then(|b| data.effect_bundle(b))
                .map(|b| b.effects())
                .unwrap_or_default();
            (t.id, effects)
        })
        .collect();

    let mut created = 0;
    for (id, effects) in techs {
        let Some(entry) = names.tech(id) else {
            tracing::debug!(tech_id = id.0, "tech has no name table entry, no object created");
            continue;
        };
        let owner = GroupRef::Tech(id);

        // Civ bonuses are applied through their civ, not as standalone techs.
        let is_bonus = data.tech(id).is_some_and(|t| t.is_unique() && !t.is_researchable());
        let updates = if is_bonus {
            Vec::new()
        } else {
            let scope = EffectScope {
                owner,
                parent: &entry.name,
                prefix: &entry.name,
            };
            effect_patches(data, names, &scope, &effects)?
        };

        let path = format!("{root}.tech.{}", entry.snake);
        let mut object = RawApiObject::new(entry.name.clone(), entry.name.clone(), Location::Path(path));
        object.add_raw_parent(TECH_TYPE);
        if let Some(raw_name) = data.tech(id).and_then(|t| t.text("name")) {
            object.add_raw_member("name", MemberValue::Text(raw_name.to_string()), TECH_TYPE);
        }
        object.add_raw_member("updates", updates, TECH_TYPE);
        data.add_raw_api_object(owner, object)?;
        created += 1;
    }
    Ok(created)
}

/// Create a civilization's main object holding its setup patches.
pub fn create_civ_object(
    data: &mut ObjectContainer,
    names: &NameTables,
    civ: CivId,
    root: &str,
    setup: Vec<ForwardRef>,
) -> Result<ForwardRef, SynthesisError> {
    let entry = names.civ(civ).ok_or(SynthesisError::MissingCivName(civ))?;
    let path = format!("{root}.civ.{}", entry.snake);
    let mut object = RawApiObject::new(entry.name.clone(), entry.name.clone(), Location::Path(path));
    object.add_raw_parent(CIV_TYPE);
    if let Some(raw_name) = data.civ(civ).and_then(|c| c.name()) {
        object.add_raw_member("name", MemberValue::Text(raw_name.to_string()), CIV_TYPE);
    }
    object.add_raw_member("civ_setup", setup, CIV_TYPE);

    let owner = GroupRef::Civ(civ);
    data.add_raw_api_object(owner, object)?;
    Ok(ForwardRef::new(owner, entry.name.clone()))
}
