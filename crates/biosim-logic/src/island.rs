//! The island grid: cells keyed by 1-based `(row, col)`, the yearly cycle,
//! and the migration protocol between orthogonal neighbours.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animal::Animal;
use crate::cell::Cell;
use crate::geography::{Geography, GeographyError};
use crate::params::Parameters;
use crate::population::{PlacementError, PopulationSpec};
use crate::species::Species;

/// 1-based `(row, col)` coordinate.
pub type Coord = (usize, usize);

/// North, south, west, east.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Per-species head count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCount {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesCount {
    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }
}

/// Head count of one cell, for density maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCount {
    pub row: usize,
    pub col: usize,
    pub herbivores: usize,
    pub carnivores: usize,
}

/// What happened during one simulated year, summed over the island.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearEvents {
    pub fodder_eaten: f64,
    pub kills: usize,
    pub births: usize,
    pub migrations: usize,
    pub deaths: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Island {
    geography: Geography,
    /// Row-major, `rows * cols` entries.
    cells: Vec<Cell>,
}

impl Island {
    pub fn new(geography: Geography) -> Self {
        let cells = geography.cells().map(|(_, terrain)| Cell::new(terrain)).collect();
        Self { geography, cells }
    }

    /// Parse a geography string and build an empty island from it.
    pub fn from_map(text: &str) -> Result<Self, GeographyError> {
        Geography::parse(text).map(Self::new)
    }

    pub fn geography(&self) -> &Geography {
        &self.geography
    }

    pub fn rows(&self) -> usize {
        self.geography.rows()
    }

    pub fn cols(&self) -> usize {
        self.geography.cols()
    }

    fn index(&self, (row, col): Coord) -> Option<usize> {
        if row == 0 || col == 0 || row > self.rows() || col > self.cols() {
            return None;
        }
        Some((row - 1) * self.cols() + (col - 1))
    }

    fn coord_of(&self, index: usize) -> Coord {
        let cols = self.cols().max(1);
        (index / cols + 1, index % cols + 1)
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        let i = self.index(coord)?;
        self.cells.get(i)
    }

    pub fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        let i = self.index(coord)?;
        self.cells.get_mut(i)
    }

    /// All cells with their coordinates, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.coord_of(i), cell))
    }

    /// Every animal on the island, cell by cell.
    pub fn animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.cells
            .iter()
            .flat_map(|c| c.herbivores().iter().chain(c.carnivores().iter()))
    }

    /// Place animals on the island. Every record is checked before any animal
    /// is placed; on error the island is unchanged.
    pub fn place_population(&mut self, records: &[PopulationSpec]) -> Result<usize, PlacementError> {
        for record in records {
            let (row, col) = record.loc;
            let cell = self
                .cell(record.loc)
                .ok_or(PlacementError::UnknownLocation { row, col })?;
            if !cell.is_passable() {
                return Err(PlacementError::Impassable {
                    row,
                    col,
                    terrain: cell.terrain(),
                });
            }
            if let Some(bad) = record
                .pop
                .iter()
                .find(|a| !a.weight.is_finite() || a.weight < 0.0)
            {
                return Err(PlacementError::InvalidWeight {
                    row,
                    col,
                    weight: bad.weight,
                });
            }
        }

        let mut placed = 0;
        for record in records {
            if let Some(cell) = self.cell_mut(record.loc) {
                for spec in &record.pop {
                    cell.add_animal(spec.to_animal());
                    placed += 1;
                }
            }
        }
        Ok(placed)
    }

    /// Run one full year.
    ///
    /// Phase order: regrowth, grazing, predation, and reproduction in every
    /// habitable cell; one migration pass over the island; then aging, weight
    /// loss, and death everywhere; finally every `has_moved` flag is cleared.
    pub fn run_year(&mut self, params: &Parameters, rng: &mut impl Rng) -> YearEvents {
        let mut events = YearEvents::default();

        for cell in self.cells.iter_mut().filter(|c| c.is_passable()) {
            cell.regrow_food(params);
            events.fodder_eaten += cell.feed_herbivores(params, rng);
            events.kills += cell.feed_carnivores(params, rng);
            events.births += cell.reproduce_herbivores(params, rng);
            events.births += cell.reproduce_carnivores(params, rng);
        }

        events.migrations = self.migrate(params, rng);

        for cell in self.cells.iter_mut().filter(|c| c.is_passable()) {
            cell.age_all();
            cell.lose_weight_all(params);
            events.deaths += cell.remove_dead(params, rng);
        }

        self.reset_migration();

        log::debug!(
            "year events: eaten={:.1} kills={} births={} migrations={} deaths={}",
            events.fodder_eaten,
            events.kills,
            events.births,
            events.migrations,
            events.deaths
        );
        events
    }

    /// One migration pass over every cell in row-major order.
    ///
    /// Animals that already moved this year are never candidates, so an
    /// animal that lands in a cell visited later stays put. A candidate gets a
    /// single random direction; water or the map edge cancels the move.
    /// Returns the number of animals that moved.
    pub fn migrate(&mut self, params: &Parameters, rng: &mut impl Rng) -> usize {
        let mut moved = 0;
        for index in 0..self.cells.len() {
            if !self.cells[index].is_passable() || self.cells[index].total() == 0 {
                continue;
            }
            let origin = self.coord_of(index);

            let herbivores = self.cells[index].emigration_candidates(Species::Herbivore, params, rng);
            let carnivores = self.cells[index].emigration_candidates(Species::Carnivore, params, rng);

            for (species, candidates) in [
                (Species::Herbivore, herbivores),
                (Species::Carnivore, carnivores),
            ] {
                let mut leaving = Vec::with_capacity(candidates.len());
                let mut targets = Vec::with_capacity(candidates.len());
                for candidate in candidates {
                    if let Some(target) = self.destination(origin, rng) {
                        leaving.push(candidate);
                        targets.push(target);
                    }
                }

                let emigrants = self.cells[index].take_emigrants(species, &leaving);
                for (animal, target) in emigrants.into_iter().zip(targets) {
                    if let Some(cell) = self.cell_mut(target) {
                        cell.receive_immigrant(animal);
                        moved += 1;
                    }
                }
            }
        }
        moved
    }

    /// Pick one of the four neighbours of `origin` uniformly at random.
    /// `None` if it lies off the map or is not passable.
    pub fn destination(&self, origin: Coord, rng: &mut impl Rng) -> Option<Coord> {
        let (dr, dc) = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];
        let target = (
            origin.0.checked_add_signed(dr)?,
            origin.1.checked_add_signed(dc)?,
        );
        self.cell(target)
            .filter(|cell| cell.is_passable())
            .map(|_| target)
    }

    pub fn reset_migration(&mut self) {
        for cell in &mut self.cells {
            cell.reset_has_moved();
        }
    }

    pub fn population_count_by_species(&self) -> SpeciesCount {
        self.cells
            .iter()
            .fold(SpeciesCount::default(), |mut acc, cell| {
                acc.herbivores += cell.herbivores().len();
                acc.carnivores += cell.carnivores().len();
                acc
            })
    }

    pub fn total_population(&self) -> usize {
        self.population_count_by_species().total()
    }

    /// Per-cell head counts, row-major, water included.
    pub fn distribution_snapshot(&self) -> Vec<CellCount> {
        self.cells()
            .map(|((row, col), cell)| CellCount {
                row,
                col,
                herbivores: cell.herbivores().len(),
                carnivores: cell.carnivores().len(),
            })
            .collect()
    }
}
