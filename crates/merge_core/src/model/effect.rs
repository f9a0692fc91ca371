//! Gameplay effects granted by shop items.
//!
//! # Invariants
//! - A valid spawn override is non-empty and contains only positive values.
//! - A valid score multiplier is finite and strictly positive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Board-modifying effect consumed by `GridEngine::apply_effect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameplayEffect {
    /// Replaces the spawn distribution wholesale.
    SpawnDistributionOverride { values: Vec<u32> },
    /// Overwrites the score multiplier (not cumulative).
    ScoreMultiplier { multiplier: f64 },
}

/// Reasons an effect payload cannot be applied to a board.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectValidationError {
    EmptySpawnDistribution,
    ZeroSpawnValue,
    InvalidMultiplier(f64),
}

impl Display for EffectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySpawnDistribution => write!(f, "spawn distribution must not be empty"),
            Self::ZeroSpawnValue => write!(f, "spawn distribution values must be positive"),
            Self::InvalidMultiplier(value) => {
                write!(f, "score multiplier must be finite and positive, got {value}")
            }
        }
    }
}

impl Error for EffectValidationError {}

impl GameplayEffect {
    /// Stable tag used in logs and wire payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SpawnDistributionOverride { .. } => "spawnDistributionOverride",
            Self::ScoreMultiplier { .. } => "scoreMultiplier",
        }
    }

    /// Checks the payload against board invariants.
    pub fn validate(&self) -> Result<(), EffectValidationError> {
        match self {
            Self::SpawnDistributionOverride { values } => validate_spawn_values(values),
            Self::ScoreMultiplier { multiplier } => validate_multiplier(*multiplier),
        }
    }
}

pub(crate) fn validate_spawn_values(values: &[u32]) -> Result<(), EffectValidationError> {
    if values.is_empty() {
        return Err(EffectValidationError::EmptySpawnDistribution);
    }
    if values.contains(&0) {
        return Err(EffectValidationError::ZeroSpawnValue);
    }
    Ok(())
}

pub(crate) fn validate_multiplier(multiplier: f64) -> Result<(), EffectValidationError> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(())
    } else {
        Err(EffectValidationError::InvalidMultiplier(multiplier))
    }
}
