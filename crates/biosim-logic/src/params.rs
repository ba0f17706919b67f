//! Simulation context: one parameter record per species and per growing
//! terrain, passed explicitly into every cell and island operation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::species::{ParamError, Species, SpeciesParams};
use crate::terrain::{LandscapeParams, Terrain, TerrainParamError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub lowland: LandscapeParams,
    pub highland: LandscapeParams,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            lowland: LandscapeParams::lowland(),
            highland: LandscapeParams::highland(),
        }
    }
}

impl Parameters {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    /// Fodder a cell of this terrain holds right after regrowth.
    pub fn fodder_capacity(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Lowland => self.lowland.f_max,
            Terrain::Highland => self.highland.f_max,
            Terrain::Desert | Terrain::Water => 0.0,
        }
    }

    pub fn set_species_params(
        &mut self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), ParamError> {
        let target = match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        };
        target.update(species, overrides).inspect_err(|e| {
            log::warn!("rejected {} parameter override: {}", species, e);
        })
    }

    pub fn set_landscape_params(
        &mut self,
        terrain: Terrain,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), TerrainParamError> {
        let target = match terrain {
            Terrain::Lowland => &mut self.lowland,
            Terrain::Highland => &mut self.highland,
            Terrain::Desert | Terrain::Water => {
                log::warn!("rejected landscape override for {}", terrain);
                return Err(TerrainParamError::NoParameters(terrain));
            }
        };
        target.update(terrain, overrides).inspect_err(|e| {
            log::warn!("rejected {} parameter override: {}", terrain, e);
        })
    }
}
