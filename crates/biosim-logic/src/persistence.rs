//! Checkpoints: save and restore a running simulation.
//!
//! Uses bincode for a compact binary snapshot. The random generator state is
//! part of the snapshot, so a restored simulation continues with exactly the
//! same draws an uninterrupted run would have made.

use std::io::{Read, Write};

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::island::Island;
use crate::params::Parameters;
use crate::simulation::{BioSim, YearRecord};

/// Version number for checkpoint format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Checkpoint format version
    pub version: u32,
    pub seed: u64,
    /// Last simulated year
    pub year: u32,
    pub params: Parameters,
    pub island: Island,
    pub rng: ChaCha8Rng,
    pub history: Vec<YearRecord>,
}

impl From<&BioSim> for SaveData {
    fn from(sim: &BioSim) -> Self {
        Self {
            version: SAVE_VERSION,
            seed: sim.seed,
            year: sim.year,
            params: sim.params.clone(),
            island: sim.island.clone(),
            rng: sim.rng.clone(),
            history: sim.history.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Checkpoint version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Write a checkpoint of `sim` to `writer`.
pub fn save_simulation<W: Write>(writer: W, sim: &BioSim) -> Result<(), SaveError> {
    bincode::serialize_into(writer, &SaveData::from(sim))?;
    log::info!("saved checkpoint at year {}", sim.year);
    Ok(())
}

/// Restore a simulation from a checkpoint.
pub fn load_simulation<R: Read>(reader: R) -> Result<BioSim, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;

    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }

    log::info!("loaded checkpoint at year {}", data.year);
    Ok(BioSim {
        island: data.island,
        params: data.params,
        rng: data.rng,
        seed: data.seed,
        year: data.year,
        history: data.history,
    })
}
