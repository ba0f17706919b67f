//! Pure simulation logic for BioSim.
//!
//! An island of square cells holds two animal species. Herbivores graze the
//! fodder that regrows in lowland and highland cells; carnivores hunt the
//! herbivores. Every year each cell runs feeding, predation, and
//! reproduction, animals migrate to neighbouring cells, and then everyone
//! ages, loses weight, and may die. All randomness flows through one seeded
//! generator, so a run is reproducible from its seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`animal`] | Fitness, birth, death, migration, and feeding rules for one animal |
//! | [`cell`] | Fodder and the two local populations of one cell |
//! | [`geography`] | Parsing and validating the terrain map |
//! | [`island`] | The cell grid, the annual cycle, and migration |
//! | [`params`] | The live parameter set for both species and both fodder terrains |
//! | [`persistence`] | Bincode checkpoints with the random generator state |
//! | [`population`] | Placement records for adding animals |
//! | [`simulation`] | [`simulation::BioSim`], the top-level handle |
//! | [`species`] | Species identifiers and per-species parameters |
//! | [`stats`] | Fitness, age, and weight samples and histograms |
//! | [`terrain`] | Terrain kinds and fodder capacity parameters |

pub mod animal;
pub mod cell;
pub mod geography;
pub mod island;
pub mod params;
pub mod persistence;
pub mod population;
pub mod simulation;
pub mod species;
pub mod stats;
pub mod terrain;

pub use simulation::{BioSim, SimulationError};
