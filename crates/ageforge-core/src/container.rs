use crate::api_object::RawApiObject;
use crate::forward_ref::{ForwardRef, Location};
use crate::group::CivGroup;
use crate::id::*;
use crate::lookup::GameVersion;
use crate::object::*;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Errors raised when a container invariant would be violated. These are
/// run-level failures, never local anomalies.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("duplicate {category} id {id}")]
    DuplicateId { category: Category, id: u32 },
    #[error("{owner} already owns an API object named '{reference}'")]
    DuplicateApiObject { owner: GroupRef, reference: String },
    #[error("API object '{reference}' of {owner} is located inside itself")]
    SelfReferentialLocation { owner: GroupRef, reference: String },
}

/// Registry of every domain object and Raw API Object of one dataset.
///
/// Identifiers are assigned once and never reused: inserting a second
/// object under a taken id fails instead of replacing the first. The
/// container is the explicit context every conversion stage receives.
#[derive(Debug, Default)]
pub struct ObjectContainer {
    pub game_version: GameVersion,
    /// Lower-cased filenames of the graphics that exist on disk.
    pub existing_graphics: HashSet<String>,
    units: BTreeMap<UnitId, UnitObject>,
    graphics: BTreeMap<GraphicId, GraphicObject>,
    techs: BTreeMap<TechId, TechObject>,
    effect_bundles: BTreeMap<EffectBundleId, EffectBundle>,
    civs: BTreeMap<CivId, CivObject>,
    civ_groups: BTreeMap<CivId, CivGroup>,
    api_objects: SlotMap<ApiObjectKey, RawApiObject>,
    api_owners: SecondaryMap<ApiObjectKey, GroupRef>,
    api_index: HashMap<(GroupRef, String), ApiObjectKey>,
}

fn insert_unique<K: Ord + Copy, V>(
    map: &mut BTreeMap<K, V>,
    id: K,
    object: V,
    category: Category,
    raw_id: u32,
) -> Result<(), ContainerError> {
    if map.contains_key(&id) {
        return Err(ContainerError::DuplicateId {
            category,
            id: raw_id,
        });
    }
    map.insert(id, object);
    Ok(())
}

impl ObjectContainer {
    pub fn new(game_version: GameVersion, existing_graphics: HashSet<String>) -> Self {
        Self {
            game_version,
            existing_graphics,
            ..Self::default()
        }
    }

    // -- Domain objects --

    pub fn insert_unit(&mut self, unit: UnitObject) -> Result<(), ContainerError> {
        let id = unit.id;
        insert_unique(&mut self.units, id, unit, Category::Unit, id.0)
    }

    pub fn insert_graphic(&mut self, graphic: GraphicObject) -> Result<(), ContainerError> {
        let id = graphic.id;
        insert_unique(&mut self.graphics, id, graphic, Category::Graphic, id.0)
    }

    pub fn insert_tech(&mut self, tech: TechObject) -> Result<(), ContainerError> {
        let id = tech.id;
        insert_unique(&mut self.techs, id, tech, Category::Tech, id.0)
    }

    pub fn insert_effect_bundle(&mut self, bundle: EffectBundle) -> Result<(), ContainerError> {
        let id = bundle.id;
        insert_unique(&mut self.effect_bundles, id, bundle, Category::EffectBundle, id.0)
    }

    pub fn insert_civ(&mut self, civ: CivObject) -> Result<(), ContainerError> {
        let id = civ.id;
        insert_unique(&mut self.civs, id, civ, Category::Civ, id.0)
    }

    pub fn insert_civ_group(&mut self, group: CivGroup) -> Result<(), ContainerError> {
        let id = group.civ;
        insert_unique(&mut self.civ_groups, id, group, Category::Civ, id.0)
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitObject> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitObject> {
        self.units.get_mut(&id)
    }

    pub fn graphic(&self, id: GraphicId) -> Option<&GraphicObject> {
        self.graphics.get(&id)
    }

    pub fn tech(&self, id: TechId) -> Option<&TechObject> {
        self.techs.get(&id)
    }

    pub fn effect_bundle(&self, id: EffectBundleId) -> Option<&EffectBundle> {
        self.effect_bundles.get(&id)
    }

    pub fn civ(&self, id: CivId) -> Option<&CivObject> {
        self.civs.get(&id)
    }

    pub fn civ_group(&self, id: CivId) -> Option<&CivGroup> {
        self.civ_groups.get(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitObject> {
        self.units.values()
    }

    pub fn graphics(&self) -> impl Iterator<Item = &GraphicObject> {
        self.graphics.values()
    }

    pub fn techs(&self) -> impl Iterator<Item = &TechObject> {
        self.techs.values()
    }

    pub fn effect_bundles(&self) -> impl Iterator<Item = &EffectBundle> {
        self.effect_bundles.values()
    }

    pub fn civs(&self) -> impl Iterator<Item = &CivObject> {
        self.civs.values()
    }

    pub fn civ_groups(&self) -> impl Iterator<Item = &CivGroup> {
        self.civ_groups.values()
    }

    pub fn is_tech_researchable(&self, id: TechId) -> bool {
        self.tech(id).is_some_and(TechObject::is_researchable)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn graphic_count(&self) -> usize {
        self.graphics.len()
    }

    pub fn tech_count(&self) -> usize {
        self.techs.len()
    }

    pub fn civ_count(&self) -> usize {
        self.civs.len()
    }

    // -- Cross-referencing --

    /// Link every graphic to the graphics its deltas reference.
    ///
    /// Must run after all graphics are inserted. Deltas naming unknown ids
    /// are ignored. The result does not depend on insertion order.
    pub fn detect_subgraphics(&mut self) {
        let links: Vec<(GraphicId, Vec<GraphicId>)> = self
            .graphics
            .values()
            .map(|g| {
                let subs = g
                    .delta_ids()
                    .into_iter()
                    .filter(|id| {
                        let known = self.graphics.contains_key(id);
                        if !known {
                            tracing::debug!(graphic_id = g.id.0, delta_id = id.0, "delta names unknown graphic, ignored");
                        }
                        known
                    })
                    .collect();
                (g.id, subs)
            })
            .collect();

        for (owner, subs) in links {
            for sub in &subs {
                if let Some(graphic) = self.graphics.get_mut(sub) {
                    graphic.add_referrer(owner);
                }
            }
            if let Some(graphic) = self.graphics.get_mut(&owner) {
                graphic.set_subgraphics(subs);
            }
        }
    }

    // -- Raw API objects --

    /// Register a Raw API Object under `owner`. The pair `(owner,
    /// reference)` must be unique; that pair is what forward references
    /// name.
    pub fn add_raw_api_object(
        &mut self,
        owner: GroupRef,
        object: RawApiObject,
    ) -> Result<ApiObjectKey, ContainerError> {
        let index_key = (owner, object.reference().to_string());
        if self.api_index.contains_key(&index_key) {
            return Err(ContainerError::DuplicateApiObject {
                owner,
                reference: index_key.1,
            });
        }
        if let Location::Nested(parent) = object.location()
            && parent.owner == owner
            && parent.target == object.reference()
        {
            return Err(ContainerError::SelfReferentialLocation {
                owner,
                reference: index_key.1,
            });
        }

        let key = self.api_objects.insert(object);
        self.api_owners.insert(key, owner);
        self.api_index.insert(index_key, key);
        Ok(key)
    }

    pub fn api_object(&self, key: ApiObjectKey) -> Option<&RawApiObject> {
        self.api_objects.get(key)
    }

    pub fn api_object_owner(&self, key: ApiObjectKey) -> Option<GroupRef> {
        self.api_owners.get(key).copied()
    }

    /// Key of the object a forward reference names, if it is registered.
    pub fn lookup(&self, r: &ForwardRef) -> Option<ApiObjectKey> {
        self.api_index.get(&(r.owner, r.target.clone())).copied()
    }

    pub fn resolve_ref(&self, r: &ForwardRef) -> Option<&RawApiObject> {
        self.lookup(r).and_then(|k| self.api_objects.get(k))
    }

    pub fn api_objects(&self) -> impl Iterator<Item = (ApiObjectKey, &RawApiObject)> {
        self.api_objects.iter()
    }

    /// All Raw API Objects owned by `owner`, in registration order.
    pub fn api_objects_of(&self, owner: GroupRef) -> Vec<&RawApiObject> {
        self.api_objects
            .iter()
            .filter(|(k, _)| self.api_owners.get(*k) == Some(&owner))
            .map(|(_, o)| o)
            .collect()
    }

    pub fn api_object_count(&self) -> usize {
        self.api_objects.len()
    }
}
