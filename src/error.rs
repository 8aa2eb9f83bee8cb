/*
 * Error Module
 *
 * Error types returned by the simulation core. Degenerate vectors are not
 * errors: the steering functions simply return the zero vector for them.
 */

use std::path::PathBuf;

use thiserror::Error;

use crate::flock::FlockId;
use crate::world::SimState;

/// Raised by `add_group` when every spawn region has been handed out.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("no spawn region available for a new flock (all {total_regions} regions are in use)")]
pub struct PlacementError {
    pub total_regions: usize,
}

/// Failures while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unknown flock {0}")]
    UnknownFlock(FlockId),

    #[error("tick requested while the simulation is {0}")]
    NotRunning(SimState),

    #[error("cannot {action} while the simulation is {state}")]
    InvalidTransition { action: &'static str, state: SimState },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SimError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
