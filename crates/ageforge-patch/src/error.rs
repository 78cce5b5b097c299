use ageforge_core::container::ContainerError;
use ageforge_core::id::CivId;

/// Errors that abort patch synthesis for the whole run.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("no name table entry for civ {0:?}")]
    MissingCivName(CivId),

    #[error("civ {0:?} has no group; run grouping before synthesis")]
    MissingCivGroup(CivId),

    #[error(transparent)]
    Container(#[from] ContainerError),
}
