//! The whole conversion: extraction, grouping, synthesis, link validation.

use crate::extract::{ExtractError, ExtractReport, extract};
use crate::grouping::build_civ_groups;
use crate::loader::{DataLoadError, load_config, load_gamedata, load_name_tables};
use crate::schema::ConvertConfig;
use ageforge_core::container::{ContainerError, ObjectContainer};
use ageforge_core::link::{self, LinkError, ResolvedNames};
use ageforge_core::lookup::NameTables;
use ageforge_core::raw::RawRecord;
use ageforge_patch::error::SynthesisError;
use ageforge_patch::{SynthesisReport, synthesize};
use std::path::Path;

/// Anything that aborts a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(
        "{} unresolvable reference(s), first: {}",
        .0.len(),
        .0.first().map(ToString::to_string).unwrap_or_default()
    )]
    Link(Vec<LinkError>),
}

/// A finished conversion, ready for an emitter.
#[derive(Debug)]
pub struct Conversion {
    pub data: ObjectContainer,
    /// Fully-qualified name of every Raw API Object in `data`.
    pub resolved: ResolvedNames,
    pub extraction: ExtractReport,
    pub synthesis: SynthesisReport,
}

/// Convert one decoded dataset.
pub fn convert<R: RawRecord + Sync>(
    root: &R,
    config: &ConvertConfig,
    names: &NameTables,
) -> Result<Conversion, PipelineError> {
    let mut data = ObjectContainer::new(config.game_version, config.known_graphics());

    let extraction = extract(root, &mut data, config.canonical_civ_index)?;
    build_civ_groups(&mut data)?;
    let synthesis = synthesize(&mut data, names, &config.namespace_root)?;
    let resolved = link::resolve_all(&data).map_err(PipelineError::Link)?;

    tracing::info!(
        game_version = ?config.game_version,
        api_objects = resolved.len(),
        "conversion finished"
    );
    Ok(Conversion {
        data,
        resolved,
        extraction,
        synthesis,
    })
}

/// Load `config`, `names` and `gamedata` from `dir` and convert.
pub fn convert_dir(dir: &Path) -> Result<Conversion, PipelineError> {
    let config = load_config(dir)?;
    let names = load_name_tables(dir, config.game_version)?;
    let root = load_gamedata(dir)?;
    tracing::debug!(dir = %dir.display(), "conversion inputs loaded");
    convert(&root, &config, &names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ageforge_core::forward_ref::ForwardRef;
    use ageforge_core::id::{CivId, GroupRef, TechId};
    use ageforge_core::lookup::NameEntry;
    use ageforge_core::test_utils::*;
    use std::fs;

    fn names() -> NameTables {
        let mut names = NameTables::new();
        names.insert_tech(TechId(101), NameEntry::new("FeudalAge", "feudal_age"));
        names.insert_civ(CivId(1), NameEntry::new("Britons", "britons"));
        names
    }

    #[test]
    fn converts_and_links() {
        let root = DatasetBuilder::new()
            .unit(raw_unit(83, "Villager"))
            .tech(101, TechSpec::researchable(-1))
            .tech(200, TechSpec::bonus(1, 3).requires(&[101]))
            .bundle(3, raw_effect_bundle("bonus", vec![raw_effect(5, 83, -1, 13, 1.1)]))
            .civ(raw_civ("Britons", -1, -1))
            .build();

        let conversion = convert(&root, &ConvertConfig::default(), &names()).unwrap();
        assert_eq!(conversion.extraction.units, 1);
        assert_eq!(conversion.synthesis.civs, 1);
        assert_eq!(
            conversion.resolved.resolve(&ForwardRef::new(GroupRef::Tech(TechId(101)), "FeudalAge")),
            Some("data.tech.feudal_age.FeudalAge")
        );
        assert!(
            conversion
                .data
                .resolve_ref(&ForwardRef::new(
                    GroupRef::Civ(CivId(1)),
                    "Britons.FeudalAgeCivBonusWrapper.FeudalAgeCivBonus"
                ))
                .is_some()
        );
    }

    #[test]
    fn missing_civs_aborts() {
        let root = record(vec![("researches", list(vec![]))]);
        let err = convert(&root, &ConvertConfig::default(), &names()).unwrap_err();
        assert!(matches!(err, PipelineError::Extract(ExtractError::MissingRoot { .. })));
    }

    #[test]
    fn link_error_display() {
        let e = PipelineError::Link(vec![LinkError::Cycle {
            reference: ForwardRef::new(GroupRef::Civ(CivId(1)), "A"),
        }]);
        let msg = format!("{e}");
        assert!(msg.starts_with("1 unresolvable reference(s)"));
        assert!(msg.contains("civ#1:A"));
    }

    #[test]
    fn convert_dir_reads_all_inputs() {
        let dir = std::env::temp_dir().join(format!("ageforge_pipeline_test_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "namespace_root = \"de2\"\n").unwrap();
        fs::write(
            dir.join("names.json"),
            r#"[{"game_version": "de2", "civs": [{"id": 1, "name": "Britons", "snake": "britons"}]}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("gamedata.json"),
            r#"{"civs": [{"name": "Gaia", "units": [{"id0": 83, "name": "Villager"}]},
                         {"name": "Britons", "team_bonus_id": -1, "tech_tree_id": -1}]}"#,
        )
        .unwrap();

        let conversion = convert_dir(&dir).unwrap();
        assert_eq!(
            conversion.resolved.resolve(&ForwardRef::new(GroupRef::Civ(CivId(1)), "Britons")),
            Some("de2.civ.britons.Britons")
        );
        assert_eq!(conversion.data.unit_count(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn convert_dir_requires_gamedata() {
        let dir = std::env::temp_dir().join(format!("ageforge_pipeline_missing_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("names.json"), "[]").unwrap();

        let err = convert_dir(&dir).unwrap_err();
        assert!(matches!(err, PipelineError::Load(DataLoadError::MissingRequired { .. })));

        let _ = fs::remove_dir_all(&dir);
    }
}
