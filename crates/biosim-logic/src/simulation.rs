//! `BioSim`: the top-level handle tying together island, parameters, random
//! stream, year counter, and population history.
//!
//! ```
//! use biosim_logic::simulation::BioSim;
//!
//! let mut sim = BioSim::default_island(1).unwrap();
//! sim.simulate(3);
//! assert_eq!(sim.year(), 3);
//! assert_eq!(sim.history().len(), 3);
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geography::GeographyError;
use crate::island::{CellCount, Island, SpeciesCount, YearEvents};
use crate::params::Parameters;
use crate::persistence::{self, SaveError};
use crate::population::{PlacementError, PopulationSpec};
use crate::species::{ParamError, Species};
use crate::stats::{HistogramSpecs, PropertyHistograms, PropertySample};
use crate::terrain::{Terrain, TerrainParamError};

/// The built-in island, 13 rows by 21 columns.
pub const DEFAULT_GEOGRAPHY: &str = "\
WWWWWWWWWWWWWWWWWWWWW
WWWWWWWWHWWWWLLLLLLLW
WHHHHHLLLLWWLLLWWLLWW
WHHHHHHHWHWWLLLLLLWWW
WHHHHLLLLLLWLLLLLLWWW
WHHHHLLLLDDLLLHLLLWWW
WHHLLLLLDDDLLLHHHHWWW
WWHHHHLLLDDLLLHWWWWWW
WHHHLLLLLDDLLLLLLLWWW
WHHHHLLLLDDLLLLWWWWWW
WWHHHHLLLLLLLLWWWWWWW
WWWHHHHLLLLLLLWWWWWWW
WWWWWWWWWWWWWWWWWWWWW";

/// 20 carnivores and 50 herbivores, all aged 5 and weighing 20, at (4, 4).
pub fn default_population() -> Vec<PopulationSpec> {
    vec![
        PopulationSpec::uniform((4, 4), Species::Carnivore, 20, 5, 20.0),
        PopulationSpec::uniform((4, 4), Species::Herbivore, 50, 5, 20.0),
    ]
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid geography: {0}")]
    Geography(#[from] GeographyError),
    #[error("invalid population: {0}")]
    Placement(#[from] PlacementError),
    #[error("invalid animal parameters: {0}")]
    Param(#[from] ParamError),
    #[error("invalid landscape parameters: {0}")]
    TerrainParam(#[from] TerrainParamError),
    #[error("checkpoint error: {0}")]
    Save(#[from] SaveError),
}

/// Population after a simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u32,
    pub herbivores: usize,
    pub carnivores: usize,
    pub events: YearEvents,
}

#[derive(Debug, Clone)]
pub struct BioSim {
    pub(crate) island: Island,
    pub(crate) params: Parameters,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) seed: u64,
    pub(crate) year: u32,
    pub(crate) history: Vec<YearRecord>,
}

impl BioSim {
    pub fn new(
        geography: &str,
        initial_population: &[PopulationSpec],
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let mut island = Island::from_map(geography)
            .inspect_err(|e| log::warn!("rejected geography: {}", e))?;
        let placed = island
            .place_population(initial_population)
            .inspect_err(|e| log::warn!("rejected initial population: {}", e))?;
        log::info!(
            "island {}x{} ready with {} animals (seed {})",
            island.rows(),
            island.cols(),
            placed,
            seed
        );
        Ok(Self {
            island,
            params: Parameters::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            year: 0,
            history: Vec::new(),
        })
    }

    /// The built-in island with the default starting population.
    pub fn default_island(seed: u64) -> Result<Self, SimulationError> {
        Self::new(DEFAULT_GEOGRAPHY, &default_population(), seed)
    }

    pub fn set_animal_parameters(
        &mut self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), SimulationError> {
        self.params.set_species_params(species, overrides)?;
        Ok(())
    }

    pub fn set_landscape_parameters(
        &mut self,
        terrain: Terrain,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), SimulationError> {
        self.params.set_landscape_params(terrain, overrides)?;
        Ok(())
    }

    pub fn add_population(&mut self, records: &[PopulationSpec]) -> Result<usize, SimulationError> {
        let placed = self
            .island
            .place_population(records)
            .inspect_err(|e| log::warn!("rejected population placement: {}", e))?;
        log::info!("added {} animals in year {}", placed, self.year);
        Ok(placed)
    }

    /// Simulate one more year and record the resulting head count.
    pub fn step(&mut self) -> YearRecord {
        let events = self.island.run_year(&self.params, &mut self.rng);
        self.year += 1;
        let count = self.island.population_count_by_species();
        let record = YearRecord {
            year: self.year,
            herbivores: count.herbivores,
            carnivores: count.carnivores,
            events,
        };
        log::info!(
            "year {}: {} herbivores, {} carnivores",
            record.year,
            record.herbivores,
            record.carnivores
        );
        self.history.push(record);
        record
    }

    /// Simulate `num_years` more years.
    pub fn simulate(&mut self, num_years: u32) {
        for _ in 0..num_years {
            self.step();
        }
    }

    /// Last year simulated.
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn num_animals(&self) -> usize {
        self.island.total_population()
    }

    pub fn num_animals_per_species(&self) -> SpeciesCount {
        self.island.population_count_by_species()
    }

    pub fn animal_distribution(&self) -> Vec<CellCount> {
        self.island.distribution_snapshot()
    }

    pub fn property_histograms(&self, species: Species, specs: &HistogramSpecs) -> PropertyHistograms {
        PropertySample::collect(&self.island, &self.params, species).histograms(specs)
    }

    pub fn history(&self) -> &[YearRecord] {
        &self.history
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Write a checkpoint file.
    pub fn save_checkpoint(&self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let file = File::create(path).map_err(SaveError::from)?;
        let mut writer = BufWriter::new(file);
        persistence::save_simulation(&mut writer, self)?;
        writer.flush().map_err(SaveError::from)?;
        Ok(())
    }

    /// Resume from a checkpoint file written by [`BioSim::save_checkpoint`].
    pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let file = File::open(path).map_err(SaveError::from)?;
        Ok(persistence::load_simulation(BufReader::new(file))?)
    }
}
