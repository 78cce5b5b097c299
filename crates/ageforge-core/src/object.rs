//! Typed domain objects wrapping raw record members.
//!
//! Each object is created once from a single raw record and keeps the
//! record's members untouched. Derived queries (researchability, sub-graphic
//! relations, parsed effects) read those members without rewriting them.

use crate::id::*;
use crate::value::{Members, Value};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Common interface
// ---------------------------------------------------------------------------

/// Shared surface of every domain object: a stable id plus raw members.
pub trait DomainObject {
    type Id: Copy + Ord + std::fmt::Debug;

    const CATEGORY: Category;

    fn id(&self) -> Self::Id;

    fn members(&self) -> &Members;

    fn members_mut(&mut self) -> &mut Members;

    fn get(&self, name: &str) -> Option<&Value> {
        self.members().get(name)
    }

    fn has_member(&self, name: &str) -> bool {
        self.members().contains_key(name)
    }

    fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// Inject a member that was not part of the object's own record.
    /// Existing members are never overwritten; returns `false` if `name`
    /// was already present.
    fn add_member(&mut self, name: &str, value: Value) -> bool {
        if self.has_member(name) {
            return false;
        }
        self.members_mut().insert(name.to_string(), value);
        true
    }
}

macro_rules! domain_object {
    ($ty:ident, $id:ty, $category:expr) => {
        impl DomainObject for $ty {
            type Id = $id;

            const CATEGORY: Category = $category;

            fn id(&self) -> $id {
                self.id
            }

            fn members(&self) -> &Members {
                &self.members
            }

            fn members_mut(&mut self) -> &mut Members {
                &mut self.members
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// A unit definition from the canonical civilization's unit table.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitObject {
    pub id: UnitId,
    members: Members,
}

domain_object!(UnitObject, UnitId, Category::Unit);

impl UnitObject {
    pub fn new(id: UnitId, members: Members) -> Self {
        Self { id, members }
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// Attack entries keyed by damage type, if the unit has any.
    pub fn attacks(&self) -> Option<&std::collections::BTreeMap<i64, Value>> {
        self.get("attacks").and_then(Value::as_keyed)
    }

    /// Armor entries keyed by damage type, if the unit has any.
    pub fn armors(&self) -> Option<&std::collections::BTreeMap<i64, Value>> {
        self.get("armors").and_then(Value::as_keyed)
    }

    pub fn commands(&self) -> &[Value] {
        self.get("unit_commands")
            .and_then(Value::as_list)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Graphics
// ---------------------------------------------------------------------------

/// A graphic (sprite) definition.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicObject {
    pub id: GraphicId,
    members: Members,
    /// `false` if the graphic's file was not among the known assets.
    pub exists: bool,
    subgraphics: Vec<GraphicId>,
    referrers: BTreeSet<GraphicId>,
}

domain_object!(GraphicObject, GraphicId, Category::Graphic);

impl GraphicObject {
    pub fn new(id: GraphicId, members: Members) -> Self {
        Self {
            id,
            members,
            exists: true,
            subgraphics: Vec::new(),
            referrers: BTreeSet::new(),
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.text("filename")
    }

    /// Graphic ids listed in this graphic's deltas, in delta order. May
    /// contain ids that are not part of the dataset.
    pub fn delta_ids(&self) -> Vec<GraphicId> {
        self.get("graphic_deltas")
            .and_then(Value::as_list)
            .unwrap_or(&[])
            .iter()
            .filter_map(|delta| delta.int_field("graphic_id"))
            .filter_map(raw_index)
            .map(GraphicId)
            .collect()
    }

    pub fn subgraphics(&self) -> &[GraphicId] {
        &self.subgraphics
    }

    /// Graphics listing this one as a sub-graphic.
    pub fn referrers(&self) -> &BTreeSet<GraphicId> {
        &self.referrers
    }

    pub fn has_subgraphics(&self) -> bool {
        !self.subgraphics.is_empty()
    }

    /// Whether more than one graphic uses this one as a sub-graphic.
    pub fn is_shared(&self) -> bool {
        self.referrers.len() > 1
    }

    /// Seconds per frame.
    pub fn frame_rate(&self) -> f64 {
        self.get("frame_rate")
            .and_then(Value::as_float)
            .unwrap_or(0.0)
    }

    /// Length of one full animation cycle in seconds.
    pub fn animation_length(&self) -> f64 {
        let frames = self.int("frame_count").unwrap_or(0);
        self.frame_rate() * frames as f64
    }

    pub(crate) fn set_subgraphics(&mut self, subgraphics: Vec<GraphicId>) {
        self.subgraphics = subgraphics;
    }

    pub(crate) fn add_referrer(&mut self, referrer: GraphicId) {
        self.referrers.insert(referrer);
    }
}

// ---------------------------------------------------------------------------
// Technologies
// ---------------------------------------------------------------------------

/// Number of prerequisite slots in a raw tech record.
pub const REQUIRED_TECH_SLOTS: usize = 6;

/// A technology (research) definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TechObject {
    pub id: TechId,
    members: Members,
}

domain_object!(TechObject, TechId, Category::Tech);

impl TechObject {
    pub fn new(id: TechId, members: Members) -> Self {
        Self { id, members }
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// A tech is researchable if some building can research it.
    pub fn is_researchable(&self) -> bool {
        self.int("research_location_id").unwrap_or(-1) > -1
    }

    /// Whether the tech belongs to a single civilization.
    pub fn is_unique(&self) -> bool {
        self.civ_id().is_some()
    }

    pub fn civ_id(&self) -> Option<CivId> {
        self.int("civilization_id")
            .and_then(raw_index)
            .map(CivId)
    }

    pub fn effect_bundle_id(&self) -> Option<EffectBundleId> {
        self.int("tech_effect_id")
            .and_then(raw_index)
            .map(EffectBundleId)
    }

    /// How many prerequisites must be met, as declared by the record.
    pub fn required_tech_count(&self) -> usize {
        self.int("required_tech_count")
            .and_then(|c| usize::try_from(c).ok())
            .unwrap_or(0)
    }

    /// Prerequisite slots in raw order, `None` for empty (`-1`) slots.
    pub fn required_tech_slots(&self) -> Vec<Option<TechId>> {
        self.get("required_techs")
            .and_then(Value::as_list)
            .unwrap_or(&[])
            .iter()
            .take(REQUIRED_TECH_SLOTS)
            .map(|v| v.as_int().and_then(raw_index).map(TechId))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// What a single tech effect does, decoded from its `type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    AttributeSet,
    ResourceModify,
    EnableUnit,
    UpgradeUnit,
    AttributeAdd,
    AttributeMultiply,
    ResourceMultiply,
    TechCostModify,
    DisableTech,
    TechTimeModify,
    Other(i64),
}

impl EffectKind {
    pub fn from_type_id(type_id: i64) -> Self {
        match type_id {
            0 => EffectKind::AttributeSet,
            1 => EffectKind::ResourceModify,
            2 => EffectKind::EnableUnit,
            3 => EffectKind::UpgradeUnit,
            4 => EffectKind::AttributeAdd,
            5 => EffectKind::AttributeMultiply,
            6 => EffectKind::ResourceMultiply,
            101 => EffectKind::TechCostModify,
            102 => EffectKind::DisableTech,
            103 => EffectKind::TechTimeModify,
            other => EffectKind::Other(other),
        }
    }
}

/// One entry of an effect bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub attr_a: i64,
    pub attr_b: i64,
    pub attr_c: i64,
    pub attr_d: f64,
}

impl Effect {
    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            kind: EffectKind::from_type_id(value.int_field("type_id")?),
            attr_a: value.int_field("attr_a").unwrap_or(-1),
            attr_b: value.int_field("attr_b").unwrap_or(-1),
            attr_c: value.int_field("attr_c").unwrap_or(-1),
            attr_d: value
                .field("attr_d")
                .and_then(Value::as_float)
                .unwrap_or(0.0),
        })
    }
}

/// A bundle of effects applied together by a tech, civ bonus or team bonus.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectBundle {
    pub id: EffectBundleId,
    members: Members,
}

domain_object!(EffectBundle, EffectBundleId, Category::EffectBundle);

impl EffectBundle {
    pub fn new(id: EffectBundleId, members: Members) -> Self {
        Self { id, members }
    }

    /// Decoded effects in record order. Entries without a type are dropped.
    pub fn effects(&self) -> Vec<Effect> {
        self.get("effects")
            .and_then(Value::as_list)
            .unwrap_or(&[])
            .iter()
            .filter_map(Effect::from_value)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Civilizations
// ---------------------------------------------------------------------------

/// A civilization record (its unit table is not part of the object).
#[derive(Debug, Clone, PartialEq)]
pub struct CivObject {
    pub id: CivId,
    members: Members,
}

domain_object!(CivObject, CivId, Category::Civ);

impl CivObject {
    pub fn new(id: CivId, members: Members) -> Self {
        Self { id, members }
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn team_bonus_id(&self) -> Option<EffectBundleId> {
        self.int("team_bonus_id")
            .and_then(raw_index)
            .map(EffectBundleId)
    }

    pub fn tech_tree_id(&self) -> Option<EffectBundleId> {
        self.int("tech_tree_id")
            .and_then(raw_index)
            .map(EffectBundleId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(fields: Vec<(&str, Value)>) -> Members {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn add_member_never_overwrites() {
        let mut unit = UnitObject::new(UnitId(4), members(vec![("name", Value::Text("Archer".into()))]));
        assert!(unit.add_member("unit_commands", Value::List(vec![])));
        assert!(!unit.add_member("name", Value::Text("Other".into())));
        assert_eq!(unit.name(), Some("Archer"));
    }

    #[test]
    fn tech_researchability_follows_location() {
        let researchable = TechObject::new(
            TechId(1),
            members(vec![("research_location_id", Value::Int(109))]),
        );
        let hidden = TechObject::new(
            TechId(2),
            members(vec![("research_location_id", Value::Int(-1))]),
        );
        let missing = TechObject::new(TechId(3), Members::new());
        assert!(researchable.is_researchable());
        assert!(!hidden.is_researchable());
        assert!(!missing.is_researchable());
    }

    #[test]
    fn tech_required_slots_keep_raw_order() {
        let tech = TechObject::new(
            TechId(9),
            members(vec![
                (
                    "required_techs",
                    Value::List(vec![
                        Value::Int(101),
                        Value::Int(-1),
                        Value::Int(22),
                        Value::Int(-1),
                        Value::Int(-1),
                        Value::Int(-1),
                    ]),
                ),
                ("required_tech_count", Value::Int(2)),
            ]),
        );
        assert_eq!(
            tech.required_tech_slots(),
            vec![Some(TechId(101)), None, Some(TechId(22)), None, None, None]
        );
        assert_eq!(tech.required_tech_count(), 2);
    }

    #[test]
    fn unique_tech_has_civ() {
        let tech = TechObject::new(TechId(5), members(vec![("civilization_id", Value::Int(3))]));
        assert!(tech.is_unique());
        assert_eq!(tech.civ_id(), Some(CivId(3)));
        let generic = TechObject::new(TechId(6), members(vec![("civilization_id", Value::Int(-1))]));
        assert!(!generic.is_unique());
    }

    #[test]
    fn effect_bundle_decodes_effects() {
        let effect = |type_id: i64| {
            Value::Record(members(vec![
                ("type_id", Value::Int(type_id)),
                ("attr_a", Value::Int(4)),
                ("attr_b", Value::Int(-1)),
                ("attr_c", Value::Int(12)),
                ("attr_d", Value::Float(1.5)),
            ]))
        };
        let bundle = EffectBundle::new(
            EffectBundleId(7),
            members(vec![(
                "effects",
                Value::List(vec![effect(5), effect(102), effect(42), Value::Int(0)]),
            )]),
        );
        let effects = bundle.effects();
        assert_eq!(effects.len(), 3);
        assert_eq!(effects[0].kind, EffectKind::AttributeMultiply);
        assert_eq!(effects[1].kind, EffectKind::DisableTech);
        assert_eq!(effects[2].kind, EffectKind::Other(42));
        assert_eq!(effects[0].attr_d, 1.5);
    }

    #[test]
    fn graphic_animation_length() {
        let graphic = GraphicObject::new(
            GraphicId(1),
            members(vec![
                ("frame_rate", Value::Float(0.5)),
                ("frame_count", Value::Int(10)),
            ]),
        );
        assert_eq!(graphic.animation_length(), 5.0);
        assert!(graphic.exists);
        assert!(!graphic.has_subgraphics());
    }

    #[test]
    fn graphic_delta_ids_skip_sentinels() {
        let delta = |id: i64| Value::Record(members(vec![("graphic_id", Value::Int(id))]));
        let graphic = GraphicObject::new(
            GraphicId(1),
            members(vec![(
                "graphic_deltas",
                Value::List(vec![delta(3), delta(-1), delta(2)]),
            )]),
        );
        assert_eq!(graphic.delta_ids(), vec![GraphicId(3), GraphicId(2)]);
    }

    #[test]
    fn civ_bundle_ids() {
        let civ = CivObject::new(
            CivId(1),
            members(vec![
                ("team_bonus_id", Value::Int(-1)),
                ("tech_tree_id", Value::Int(254)),
            ]),
        );
        assert_eq!(civ.team_bonus_id(), None);
        assert_eq!(civ.tech_tree_id(), Some(EffectBundleId(254)));
    }
}
