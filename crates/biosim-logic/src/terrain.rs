//! Terrain types, their map codes, and fodder capacity.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Landscape of a single island cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Lowland,
    Highland,
    Desert,
}

impl Terrain {
    pub const ALL: [Terrain; 4] = [
        Terrain::Water,
        Terrain::Lowland,
        Terrain::Highland,
        Terrain::Desert,
    ];

    /// Parse a geography character (`W`, `L`, `H`, `D`).
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(Terrain::Water),
            'L' => Some(Terrain::Lowland),
            'H' => Some(Terrain::Highland),
            'D' => Some(Terrain::Desert),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Lowland => 'L',
            Terrain::Highland => 'H',
            Terrain::Desert => 'D',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Water => "Water",
            Terrain::Lowland => "Lowland",
            Terrain::Highland => "Highland",
            Terrain::Desert => "Desert",
        }
    }

    /// Water is the only terrain animals can neither live in nor enter.
    pub fn is_passable(self) -> bool {
        !matches!(self, Terrain::Water)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Terrain {
    type Err = TerrainParamError;

    /// Accepts the full name (`"Lowland"`) or the single-letter map code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(t) = Terrain::ALL.iter().find(|t| t.name() == s) {
            return Ok(*t);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Terrain::from_code(c).ok_or_else(|| TerrainParamError::UnknownTerrain(s.into()))
            }
            _ => Err(TerrainParamError::UnknownTerrain(s.into())),
        }
    }
}

/// Rejected landscape parameter override.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainParamError {
    #[error("unknown terrain: {0}")]
    UnknownTerrain(String),
    #[error("{0} has no adjustable parameters")]
    NoParameters(Terrain),
    #[error("invalid parameter name for {terrain}: {key}")]
    UnknownKey { terrain: Terrain, key: String },
    #[error("f_max must be non-negative (got {0})")]
    Negative(f64),
    #[error("f_max must be a finite number")]
    NotFinite,
}

/// Fodder parameters of a growing terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandscapeParams {
    /// Fodder available after the yearly regrowth.
    pub f_max: f64,
}

impl LandscapeParams {
    pub fn lowland() -> Self {
        Self { f_max: 800.0 }
    }

    pub fn highland() -> Self {
        Self { f_max: 300.0 }
    }

    /// Apply overrides; `f_max` is the only key.
    pub fn update(
        &mut self,
        terrain: Terrain,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), TerrainParamError> {
        let mut f_max = self.f_max;
        for (key, &value) in overrides {
            if key != "f_max" {
                return Err(TerrainParamError::UnknownKey {
                    terrain,
                    key: key.clone(),
                });
            }
            if !value.is_finite() {
                return Err(TerrainParamError::NotFinite);
            }
            if value < 0.0 {
                return Err(TerrainParamError::Negative(value));
            }
            f_max = value;
        }
        self.f_max = f_max;
        Ok(())
    }
}
