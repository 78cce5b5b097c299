//! Shared test helpers for unit tests and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. Provides raw
//! record builders shaped like decoder output, plus shortcuts that turn
//! them straight into domain objects.

use crate::id::*;
use crate::object::*;
use crate::raw::{RawRecord, RawValue};
use crate::value::{Members, Value};

// ===========================================================================
// Raw value shorthands
// ===========================================================================

pub fn int(v: i64) -> RawValue {
    RawValue::Int(v)
}

pub fn float(v: f64) -> RawValue {
    RawValue::Float(v)
}

pub fn text(s: &str) -> RawValue {
    RawValue::Text(s.to_string())
}

pub fn list(items: Vec<RawValue>) -> RawValue {
    RawValue::List(items)
}

pub fn record(fields: Vec<(&str, RawValue)>) -> RawValue {
    RawValue::Record(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn members_of(raw: &RawValue) -> Members {
    match raw.to_value() {
        Value::Record(members) => members,
        _ => Members::new(),
    }
}

// ===========================================================================
// Units
// ===========================================================================

pub fn raw_unit(id: i64, name: &str) -> RawValue {
    record(vec![("id0", int(id)), ("name", text(name))])
}

/// `(type_id, amount)` pairs.
fn combat_list(entries: &[(i64, i64)]) -> RawValue {
    list(
        entries
            .iter()
            .map(|&(type_id, amount)| record(vec![("type_id", int(type_id)), ("amount", int(amount))]))
            .collect(),
    )
}

/// A unit with attack and armor lists given as `(type_id, amount)` pairs.
pub fn raw_combat_unit(id: i64, name: &str, attacks: &[(i64, i64)], armors: &[(i64, i64)]) -> RawValue {
    record(vec![
        ("id0", int(id)),
        ("name", text(name)),
        ("attacks", combat_list(attacks)),
        ("armors", combat_list(armors)),
    ])
}

pub fn raw_command(type_id: i64) -> RawValue {
    record(vec![("type", int(type_id)), ("enabled", int(1))])
}

// ===========================================================================
// Graphics
// ===========================================================================

pub fn raw_graphic(id: i64, filename: &str, deltas: &[i64]) -> RawValue {
    record(vec![
        ("graphic_id", int(id)),
        ("filename", text(filename)),
        ("frame_count", int(10)),
        ("frame_rate", float(0.1)),
        (
            "graphic_deltas",
            list(
                deltas
                    .iter()
                    .map(|&d| record(vec![("graphic_id", int(d))]))
                    .collect(),
            ),
        ),
    ])
}

pub fn graphic_object(id: u32, filename: &str, deltas: &[i64]) -> GraphicObject {
    GraphicObject::new(GraphicId(id), members_of(&raw_graphic(i64::from(id), filename, deltas)))
}

// ===========================================================================
// Technologies
// ===========================================================================

/// Builder for raw tech records.
#[derive(Debug, Clone)]
pub struct TechSpec {
    name: Option<String>,
    civ: i64,
    effect: i64,
    location: i64,
    required: Vec<i64>,
    count: Option<i64>,
}

impl TechSpec {
    /// A tech researchable at a building, available to everyone.
    pub fn researchable(effect: i64) -> Self {
        Self {
            name: None,
            civ: -1,
            effect,
            location: 109,
            required: Vec::new(),
            count: None,
        }
    }

    /// A tech nobody can research, available to everyone.
    pub fn hidden(effect: i64) -> Self {
        Self {
            location: -1,
            ..Self::researchable(effect)
        }
    }

    /// A civilization bonus: not researchable, bound to `civ`.
    pub fn bonus(civ: i64, effect: i64) -> Self {
        Self {
            civ,
            ..Self::hidden(effect)
        }
    }

    /// Bind the tech to `civ`. On a researchable tech this makes it a
    /// unique tech.
    pub fn for_civ(mut self, civ: i64) -> Self {
        self.civ = civ;
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set the prerequisite slots. The count follows unless overridden.
    pub fn requires(mut self, techs: &[i64]) -> Self {
        self.required = techs.to_vec();
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn to_raw(&self) -> RawValue {
        let mut slots: Vec<RawValue> = self.required.iter().map(|&t| int(t)).collect();
        slots.resize(REQUIRED_TECH_SLOTS, int(-1));
        let count = self.count.unwrap_or(self.required.len() as i64);
        let mut fields = vec![
            ("required_techs", list(slots)),
            ("required_tech_count", int(count)),
            ("civilization_id", int(self.civ)),
            ("tech_effect_id", int(self.effect)),
            ("research_location_id", int(self.location)),
        ];
        if let Some(name) = &self.name {
            fields.push(("name", text(name)));
        }
        record(fields)
    }
}

pub fn tech_object(id: u32, spec: TechSpec) -> TechObject {
    TechObject::new(TechId(id), members_of(&spec.to_raw()))
}

// ===========================================================================
// Effects and civilizations
// ===========================================================================

pub fn raw_effect(type_id: i64, attr_a: i64, attr_b: i64, attr_c: i64, attr_d: f64) -> RawValue {
    record(vec![
        ("type_id", int(type_id)),
        ("attr_a", int(attr_a)),
        ("attr_b", int(attr_b)),
        ("attr_c", int(attr_c)),
        ("attr_d", float(attr_d)),
    ])
}

pub fn raw_effect_bundle(name: &str, effects: Vec<RawValue>) -> RawValue {
    record(vec![("name", text(name)), ("effects", list(effects))])
}

pub fn raw_civ(name: &str, team_bonus: i64, tech_tree: i64) -> RawValue {
    record(vec![
        ("name", text(name)),
        ("team_bonus_id", int(team_bonus)),
        ("tech_tree_id", int(tech_tree)),
        ("units", list(Vec::new())),
    ])
}

// ===========================================================================
// Whole datasets
// ===========================================================================

/// Builds a raw root record with the layout the extractor expects.
///
/// Lists whose identifiers are positional (techs, effect bundles, unit
/// headers) are padded with inert filler when an entry is placed at an
/// index beyond the current end. Civ 0 is the neutral group and receives
/// every unit.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    civs: Vec<RawValue>,
    units: Vec<RawValue>,
    unit_headers: Vec<RawValue>,
    graphics: Vec<RawValue>,
    techs: Vec<RawValue>,
    bundles: Vec<RawValue>,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn place(items: &mut Vec<RawValue>, index: usize, item: RawValue, filler: RawValue) {
    if items.len() <= index {
        items.resize(index + 1, filler);
    }
    items[index] = item;
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self {
            civs: vec![raw_civ("Gaia", -1, -1)],
            units: Vec::new(),
            unit_headers: Vec::new(),
            graphics: Vec::new(),
            techs: Vec::new(),
            bundles: Vec::new(),
        }
    }

    pub fn unit(mut self, unit: RawValue) -> Self {
        self.units.push(unit);
        self
    }

    pub fn unit_header(mut self, unit_id: usize, commands: Vec<RawValue>) -> Self {
        let header = record(vec![("exists", int(1)), ("unit_commands", list(commands))]);
        place(
            &mut self.unit_headers,
            unit_id,
            header,
            record(vec![("exists", int(0))]),
        );
        self
    }

    pub fn graphic(mut self, graphic: RawValue) -> Self {
        self.graphics.push(graphic);
        self
    }

    pub fn tech(mut self, id: usize, spec: TechSpec) -> Self {
        place(&mut self.techs, id, spec.to_raw(), TechSpec::hidden(-1).to_raw());
        self
    }

    pub fn bundle(mut self, id: usize, bundle: RawValue) -> Self {
        place(
            &mut self.bundles,
            id,
            bundle,
            raw_effect_bundle("", Vec::new()),
        );
        self
    }

    /// Append a civilization; its id is its position (Gaia is 0).
    pub fn civ(mut self, civ: RawValue) -> Self {
        self.civs.push(civ);
        self
    }

    pub fn build(self) -> RawValue {
        let mut civs = self.civs;
        if let Some(RawValue::Record(gaia)) = civs.first_mut() {
            gaia.insert("units".to_string(), list(self.units));
        }
        record(vec![
            ("civs", list(civs)),
            ("unit_headers", list(self.unit_headers)),
            ("graphics", list(self.graphics)),
            ("researches", list(self.techs)),
            ("effect_bundles", list(self.bundles)),
        ])
    }
}
