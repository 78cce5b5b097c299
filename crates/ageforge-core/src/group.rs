//! Conversion groups built on top of extracted domain objects.
//!
//! A [`CivGroup`] gathers everything a civilization contributes to the
//! target model: its unique techs and units, bonuses, team bonus and tech
//! tree. Groups are formed after extraction, once every tech and effect
//! bundle exists.

use crate::container::ObjectContainer;
use crate::id::*;
use crate::object::{Effect, EffectKind, TechObject};
use std::collections::{BTreeMap, BTreeSet};

/// A civilization bonus: a non-researchable tech bound to one civilization
/// whose effects the civilization receives, possibly gated by prerequisites.
#[derive(Debug, Clone, PartialEq)]
pub struct CivBonus {
    pub tech: TechId,
    pub civ: CivId,
    pub effect_bundle: EffectBundleId,
    required_tech_count: usize,
    required_slots: Vec<Option<TechId>>,
}

impl CivBonus {
    /// Build a bonus view of `tech`. Returns `None` if the tech has no
    /// effect bundle or no owning civilization.
    pub fn from_tech(tech: &TechObject) -> Option<Self> {
        Some(Self {
            tech: tech.id,
            civ: tech.civ_id()?,
            effect_bundle: tech.effect_bundle_id()?,
            required_tech_count: tech.required_tech_count(),
            required_slots: tech.required_tech_slots(),
        })
    }

    pub fn required_tech_count(&self) -> usize {
        self.required_tech_count
    }

    /// The prerequisite slot at `index`, `None` if empty or out of range.
    pub fn required_tech(&self, index: usize) -> Option<TechId> {
        self.required_slots.get(index).copied().flatten()
    }

    /// The first `required_tech_count` prerequisite slots, raw order kept.
    pub fn required_techs(&self) -> Vec<Option<TechId>> {
        self.required_slots
            .iter()
            .take(self.required_tech_count)
            .copied()
            .collect()
    }

    /// Whether some researchable tech applies the same effect bundle, i.e.
    /// the bonus is the civ-specific copy of a researchable technology.
    pub fn replaced_tech(&self, data: &ObjectContainer) -> Option<TechId> {
        data.techs()
            .filter(|t| t.is_researchable())
            .find(|t| t.effect_bundle_id() == Some(self.effect_bundle))
            .map(|t| t.id)
    }

    pub fn replaces_researchable_tech(&self, data: &ObjectContainer) -> bool {
        self.replaced_tech(data).is_some()
    }

    pub fn effects(&self, data: &ObjectContainer) -> Vec<Effect> {
        data.effect_bundle(self.effect_bundle)
            .map(|b| b.effects())
            .unwrap_or_default()
    }
}

/// Everything a civilization contributes to the target model.
#[derive(Debug, Clone, PartialEq)]
pub struct CivGroup {
    pub civ: CivId,
    /// Bonuses keyed by the tech that carries them.
    pub civ_boni: BTreeMap<TechId, CivBonus>,
    /// Researchable techs only this civilization has.
    pub unique_techs: BTreeSet<TechId>,
    pub team_bonus: Option<EffectBundleId>,
    pub tech_tree: Option<EffectBundleId>,
}

impl CivGroup {
    pub fn new(civ: CivId) -> Self {
        Self {
            civ,
            civ_boni: BTreeMap::new(),
            unique_techs: BTreeSet::new(),
            team_bonus: None,
            tech_tree: None,
        }
    }

    pub fn owner(&self) -> GroupRef {
        GroupRef::Civ(self.civ)
    }

    pub fn team_bonus_effects(&self, data: &ObjectContainer) -> Vec<Effect> {
        self.team_bonus
            .and_then(|id| data.effect_bundle(id))
            .map(|b| b.effects())
            .unwrap_or_default()
    }

    pub fn tech_tree_effects(&self, data: &ObjectContainer) -> Vec<Effect> {
        self.tech_tree
            .and_then(|id| data.effect_bundle(id))
            .map(|b| b.effects())
            .unwrap_or_default()
    }

    /// Units this civilization enables for itself, in first-seen order.
    ///
    /// Read from enable-unit effects (mode `1`) of the tech tree, the
    /// unique techs and the bonuses. Units missing from the dataset are
    /// left out.
    pub fn enabled_units(&self, data: &ObjectContainer) -> Vec<UnitId> {
        let unique_tech_effects = self
            .unique_techs
            .iter()
            .filter_map(|id| data.tech(*id)?.effect_bundle_id())
            .filter_map(|bundle| data.effect_bundle(bundle))
            .flat_map(|b| b.effects());
        let bonus_effects = self.civ_boni.values().flat_map(|b| b.effects(data));

        let mut units = Vec::new();
        for effect in self
            .tech_tree_effects(data)
            .into_iter()
            .chain(unique_tech_effects)
            .chain(bonus_effects)
        {
            if effect.kind != EffectKind::EnableUnit || effect.attr_b != 1 {
                continue;
            }
            let Some(unit) = raw_index(effect.attr_a).map(UnitId) else {
                continue;
            };
            if data.unit(unit).is_some() && !units.contains(&unit) {
                units.push(unit);
            }
        }
        units
    }
}
