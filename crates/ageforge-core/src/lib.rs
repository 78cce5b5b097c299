//! Ageforge Core -- the object graph of a legacy game data conversion.
//!
//! This crate holds everything later conversion stages share: typed domain
//! objects wrapping decoded records, the per-dataset [`container`], and the
//! target-model builders ([`api_object::RawApiObject`]) linked together by
//! deferred symbolic references ([`forward_ref::ForwardRef`]).
//!
//! # Two-Phase Linking
//!
//! Raw API Objects refer to each other by `(owner group, reference name)`
//! and are registered in any order. Nothing is resolved while objects are
//! being built; once the container is complete the [`link`] pass computes
//! every fully-qualified name and reports dangling or cyclic references:
//!
//! ```rust,ignore
//! let wrapper = RawApiObject::new("Britons.Wrapper", "Wrapper",
//!     Location::Nested(ForwardRef::new(civ, "Britons")));
//! data.add_raw_api_object(civ, wrapper)?;
//! // ... the civ's own object may be registered later ...
//! let names = link::resolve_all(&data)?;
//! ```
//!
//! # Key Types
//!
//! - [`raw::RawRecord`] -- Capability interface over decoded input records.
//! - [`object::DomainObject`] -- Units, graphics, techs, effect bundles, civs.
//! - [`group::CivGroup`] -- A civilization with its bonuses and bundles.
//! - [`container::ObjectContainer`] -- Registry keyed by category and id.
//! - [`lookup::NameTables`] -- External id to name tables.

pub mod api_object;
pub mod container;
pub mod forward_ref;
pub mod group;
pub mod id;
pub mod link;
pub mod lookup;
pub mod object;
pub mod raw;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
