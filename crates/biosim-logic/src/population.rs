//! Population placement records, as read from input files.
//!
//! A record names a 1-based `(row, col)` location and the animals to put
//! there:
//!
//! ```json
//! [{"loc": [4, 4], "pop": [{"species": "Herbivore", "age": 5, "weight": 20.0}]}]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animal::Animal;
use crate::species::Species;
use crate::terrain::Terrain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSpec {
    pub species: Species,
    pub age: u32,
    pub weight: f64,
}

impl AnimalSpec {
    pub fn to_animal(&self) -> Animal {
        Animal::new(self.species, self.age, self.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSpec {
    pub loc: (usize, usize),
    pub pop: Vec<AnimalSpec>,
}

impl PopulationSpec {
    /// `count` identical animals at `loc`.
    pub fn uniform(loc: (usize, usize), species: Species, count: usize, age: u32, weight: f64) -> Self {
        Self {
            loc,
            pop: vec![
                AnimalSpec {
                    species,
                    age,
                    weight,
                };
                count
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("location ({row}, {col}) is not on the map")]
    UnknownLocation { row: usize, col: usize },
    #[error("location ({row}, {col}) is {terrain}, which is not habitable")]
    Impassable {
        row: usize,
        col: usize,
        terrain: Terrain,
    },
    #[error("invalid weight {weight} for animal at ({row}, {col})")]
    InvalidWeight { row: usize, col: usize, weight: f64 },
}
