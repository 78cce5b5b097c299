//! Wrapper + nyan patch pairs.
//!
//! Every modification the converter emits has the same shape: a wrapper
//! object inheriting from the generic patch type, nested inside the owning
//! group's main object, and the actual nyan patch nested inside the
//! wrapper. The wrapper's `patch` member points at the nyan patch, and the
//! nyan patch's target is the object being modified.

use ageforge_core::api_object::{
    MemberOperator, MemberValue, NYAN_PATCH_TYPE, PATCH_TYPE, RawApiObject,
};
use ageforge_core::container::{ContainerError, ObjectContainer};
use ageforge_core::forward_ref::{ForwardRef, Location};
use ageforge_core::id::GroupRef;

/// A member update carried by a nyan patch.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchMember {
    pub name: String,
    pub value: MemberValue,
    pub origin: &'static str,
    pub operator: MemberOperator,
}

impl PatchMember {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<MemberValue>,
        origin: &'static str,
        operator: MemberOperator,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin,
            operator,
        }
    }
}

/// Register a wrapper/patch pair and return a reference to the wrapper.
///
/// `parent` is the reference of the owner's object the wrapper is nested
/// in; `stem` names the patch (the wrapper is `{stem}Wrapper`).
pub fn register_patch(
    data: &mut ObjectContainer,
    owner: GroupRef,
    parent: &str,
    stem: &str,
    target: ForwardRef,
    members: Vec<PatchMember>,
) -> Result<ForwardRef, ContainerError> {
    let wrapper_name = format!("{stem}Wrapper");
    let wrapper_ref = format!("{parent}.{wrapper_name}");
    let mut wrapper = RawApiObject::new(
        wrapper_ref.clone(),
        wrapper_name,
        Location::Nested(ForwardRef::new(owner, parent)),
    );
    wrapper.add_raw_parent(PATCH_TYPE);

    let patch_ref = format!("{wrapper_ref}.{stem}");
    let mut patch = RawApiObject::new(
        patch_ref.clone(),
        stem,
        Location::Nested(ForwardRef::new(owner, wrapper_ref.clone())),
    );
    patch.add_raw_parent(NYAN_PATCH_TYPE);
    patch.set_patch_target(target);
    for member in members {
        patch.add_raw_patch_member(member.name, member.value, member.origin, member.operator);
    }

    wrapper.add_raw_member("patch", ForwardRef::new(owner, patch_ref), PATCH_TYPE);

    data.add_raw_api_object(owner, wrapper)?;
    data.add_raw_api_object(owner, patch)?;
    Ok(ForwardRef::new(owner, wrapper_ref))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ageforge_core::id::{CivId, TechId};

    #[test]
    fn wrapper_nests_patch() {
        let mut data = ObjectContainer::default();
        let civ = GroupRef::Civ(CivId(1));
        let target = ForwardRef::new(GroupRef::Tech(TechId(101)), "FeudalAge");
        let wrapper_ref = register_patch(
            &mut data,
            civ,
            "Britons",
            "FeudalAgeCivBonus",
            target.clone(),
            vec![PatchMember::new(
                "updates",
                MemberValue::List(vec![]),
                "engine.aux.tech.Tech",
                MemberOperator::Add,
            )],
        )
        .unwrap();

        assert_eq!(wrapper_ref.target, "Britons.FeudalAgeCivBonusWrapper");
        let wrapper = data.resolve_ref(&wrapper_ref).unwrap();
        assert_eq!(wrapper.parents(), &[PATCH_TYPE]);
        assert_eq!(
            wrapper.location(),
            &Location::Nested(ForwardRef::new(civ, "Britons"))
        );

        let patch_ref = ForwardRef::new(civ, "Britons.FeudalAgeCivBonusWrapper.FeudalAgeCivBonus");
        let patch = data.resolve_ref(&patch_ref).unwrap();
        assert_eq!(patch.patch_target(), Some(&target));
        assert_eq!(patch.name(), "FeudalAgeCivBonus");
        assert_eq!(
            wrapper.member("patch").map(|m| &m.value),
            Some(&MemberValue::Ref(patch_ref))
        );
    }

    #[test]
    fn same_stem_twice_is_a_duplicate() {
        let mut data = ObjectContainer::default();
        let civ = GroupRef::Civ(CivId(1));
        let target = ForwardRef::new(civ, "Britons");
        register_patch(&mut data, civ, "Britons", "X", target.clone(), vec![]).unwrap();
        assert!(register_patch(&mut data, civ, "Britons", "X", target, vec![]).is_err());
    }
}
