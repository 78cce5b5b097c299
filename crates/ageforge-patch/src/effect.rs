//! Generic effect to patch translation.
//!
//! One wrapper/patch pair is emitted per supported effect. The pair is
//! nested under the owning group's main object and aimed at whatever the
//! effect modifies: a unit, the owning civilization, or a tech.

use crate::error::SynthesisError;
use crate::objects::{CIV_TYPE, GAME_ENTITY_TYPE, TECH_TYPE, civ_ref, tech_ref, unit_reference};
use crate::patch::{PatchMember, register_patch};
use ageforge_core::api_object::{MemberOperator, MemberValue};
use ageforge_core::container::ObjectContainer;
use ageforge_core::forward_ref::ForwardRef;
use ageforge_core::id::*;
use ageforge_core::lookup::NameTables;
use ageforge_core::object::{Effect, EffectKind};

/// Where the patches of one effect list are registered.
#[derive(Debug, Clone, Copy)]
pub struct EffectScope<'a> {
    /// Group that owns the generated objects.
    pub owner: GroupRef,
    /// Reference of the owner's main object the wrappers are nested in.
    pub parent: &'a str,
    /// Prepended to every patch name so different effect lists of the same
    /// owner never collide.
    pub prefix: &'a str,
}

fn kind_label(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::AttributeSet => "AttributeSet",
        EffectKind::AttributeAdd => "AttributeAdd",
        EffectKind::AttributeMultiply => "AttributeMultiply",
        EffectKind::ResourceModify => "ResourceModify",
        EffectKind::ResourceMultiply => "ResourceMultiply",
        EffectKind::TechCostModify => "TechCost",
        EffectKind::TechTimeModify => "TechTime",
        EffectKind::DisableTech => "DisableTech",
        EffectKind::EnableUnit => "EnableUnit",
        EffectKind::UpgradeUnit => "UpgradeUnit",
        EffectKind::Other(_) => "Effect",
    }
}

/// Target member name of a unit attribute id.
pub fn attribute_member(attribute: i64) -> Option<&'static str> {
    Some(match attribute {
        0 => "max_hit_points",
        1 => "line_of_sight",
        2 => "garrison_capacity",
        5 => "speed",
        10 => "reload_time",
        12 => "max_range",
        13 => "work_rate",
        14 => "carry_capacity",
        101 => "creation_time",
        _ => return None,
    })
}

/// Name of a resource id as used in member names.
pub fn resource_name(resource: i64) -> Option<&'static str> {
    Some(match resource {
        0 => "food",
        1 => "wood",
        2 => "stone",
        3 => "gold",
        _ => return None,
    })
}

/// `0` sets, `1` adds; anything else is not a known mode.
fn set_or_add(mode: i64) -> Option<MemberOperator> {
    match mode {
        0 => Some(MemberOperator::Assign),
        1 => Some(MemberOperator::Add),
        _ => None,
    }
}

/// An id stored in a float attribute. Only finite whole numbers qualify.
fn float_index(value: f64) -> Option<u32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    raw_index(value as i64)
}

/// What a single effect turns into: a target and the members to patch.
fn translate(
    data: &ObjectContainer,
    names: &NameTables,
    scope: &EffectScope<'_>,
    effect: &Effect,
) -> Result<Option<(ForwardRef, PatchMember)>, SynthesisError> {
    let translated = match effect.kind {
        EffectKind::AttributeSet | EffectKind::AttributeAdd | EffectKind::AttributeMultiply => {
            let Some(unit) = raw_index(effect.attr_a).and_then(|id| data.unit(UnitId(id))) else {
                return Ok(None);
            };
            let Some(member) = attribute_member(effect.attr_c) else {
                return Ok(None);
            };
            let operator = match effect.kind {
                EffectKind::AttributeSet => MemberOperator::Assign,
                EffectKind::AttributeAdd => MemberOperator::Add,
                _ => MemberOperator::Multiply,
            };
            let target = ForwardRef::new(GroupRef::Unit(unit.id), unit_reference(unit));
            Some((
                target,
                PatchMember::new(member, MemberValue::Float(effect.attr_d), GAME_ENTITY_TYPE, operator),
            ))
        }

        EffectKind::ResourceModify | EffectKind::ResourceMultiply => {
            let GroupRef::Civ(civ) = scope.owner else {
                return Ok(None);
            };
            let Some(resource) = resource_name(effect.attr_a) else {
                return Ok(None);
            };
            let operator = if effect.kind == EffectKind::ResourceMultiply {
                Some(MemberOperator::Multiply)
            } else {
                set_or_add(effect.attr_b)
            };
            let Some(operator) = operator else {
                return Ok(None);
            };
            Some((
                civ_ref(names, civ)?,
                PatchMember::new(
                    format!("starting_{resource}"),
                    MemberValue::Float(effect.attr_d),
                    CIV_TYPE,
                    operator,
                ),
            ))
        }

        EffectKind::TechCostModify | EffectKind::TechTimeModify => {
            let Some(target) = raw_index(effect.attr_a).and_then(|id| tech_ref(data, names, TechId(id)))
            else {
                return Ok(None);
            };
            let Some(operator) = set_or_add(effect.attr_c) else {
                return Ok(None);
            };
            let member = if effect.kind == EffectKind::TechCostModify {
                match resource_name(effect.attr_b) {
                    Some(resource) => format!("{resource}_cost"),
                    None => return Ok(None),
                }
            } else {
                "research_time".to_string()
            };
            Some((
                target,
                PatchMember::new(member, MemberValue::Float(effect.attr_d), TECH_TYPE, operator),
            ))
        }

        EffectKind::DisableTech => {
            // The disabled tech id is stored in the float attribute.
            let Some(target) = float_index(effect.attr_d).and_then(|id| tech_ref(data, names, TechId(id)))
            else {
                return Ok(None);
            };
            Some((
                target,
                PatchMember::new(
                    "researchable",
                    MemberValue::Bool(false),
                    TECH_TYPE,
                    MemberOperator::Assign,
                ),
            ))
        }

        EffectKind::EnableUnit | EffectKind::UpgradeUnit | EffectKind::Other(_) => None,
    };
    Ok(translated)
}

/// Emit one wrapper/patch pair per supported effect and return references
/// to the wrappers, in effect order.
///
/// Effects that cannot be expressed (unsupported kind, unknown unit or
/// tech, resource changes outside a civilization) are skipped.
pub fn effect_patches(
    data: &mut ObjectContainer,
    names: &NameTables,
    scope: &EffectScope<'_>,
    effects: &[Effect],
) -> Result<Vec<ForwardRef>, SynthesisError> {
    let mut wrappers = Vec::with_capacity(effects.len());
    for (index, effect) in effects.iter().enumerate() {
        let Some((target, member)) = translate(data, names, scope, effect)? else {
            tracing::debug!(
                owner = %scope.owner,
                kind = ?effect.kind,
                index,
                "effect has no target-model equivalent, skipped"
            );
            continue;
        };
        let stem = format!("{}{}{index}", scope.prefix, kind_label(effect.kind));
        let wrapper = register_patch(data, scope.owner, scope.parent, &stem, target, vec![member])?;
        wrappers.push(wrapper);
    }
    Ok(wrappers)
}
