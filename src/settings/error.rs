use std::{io, path::PathBuf};

use thiserror::Error;

use crate::core::AllocationError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not write settings to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure of the "save as new defaults" action.
#[derive(Debug, Error)]
pub enum DefaultsError {
    #[error(transparent)]
    Invalid(#[from] AllocationError),

    #[error(transparent)]
    Store(#[from] SettingsError),
}
