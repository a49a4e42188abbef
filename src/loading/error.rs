//! Error types for loading levels.

use thiserror::Error;

use crate::catalog::DataLoadError;

use super::steps::LoadStep;

/// Failure reported by a subsystem step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Data(#[from] DataLoadError),
}

impl StepError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Reasons a level load was aborted.
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("Level '{0}' not found")]
    LevelNotFound(String),

    #[error("Failed to read level info for '{level}': {source}")]
    ReadInfo {
        level: String,
        #[source]
        source: DataLoadError,
    },

    #[error("Loading '{level}' failed at {step}: {reason}")]
    StepFailed {
        level: String,
        step: LoadStep,
        reason: String,
    },
}
