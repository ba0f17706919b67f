//! One island cell: its terrain, fodder, and the two local populations.
//!
//! The island calls these steps in a fixed yearly order. Each step mutates
//! the population lists in place; removals and births are staged and applied
//! after the pass over the list, never during it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animal::Animal;
use crate::params::Parameters;
use crate::species::Species;
use crate::terrain::Terrain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    terrain: Terrain,
    available_food: f64,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            available_food: 0.0,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }

    pub fn available_food(&self) -> f64 {
        self.available_food
    }

    pub fn herbivores(&self) -> &[Animal] {
        &self.herbivores
    }

    pub fn carnivores(&self) -> &[Animal] {
        &self.carnivores
    }

    pub fn population(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    fn population_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn count(&self, species: Species) -> usize {
        self.population(species).len()
    }

    pub fn total(&self) -> usize {
        self.herbivores.len() + self.carnivores.len()
    }

    /// Append an animal to the list of its species. The island checks that
    /// the cell is passable before calling this.
    pub fn add_animal(&mut self, animal: Animal) {
        self.population_mut(animal.species).push(animal);
    }

    /// Reset fodder to the terrain capacity, whatever was left.
    pub fn regrow_food(&mut self, params: &Parameters) {
        self.available_food = params.fodder_capacity(self.terrain);
    }

    /// Herbivores graze in random order, each eating up to its appetite `F`.
    /// Returns the fodder consumed.
    pub fn feed_herbivores(&mut self, params: &Parameters, rng: &mut impl Rng) -> f64 {
        let hp = &params.herbivore;
        self.herbivores.shuffle(rng);

        let mut eaten = 0.0;
        for herbivore in &mut self.herbivores {
            if self.available_food <= 0.0 {
                break;
            }
            let portion = self.available_food.min(hp.f);
            herbivore.feed(portion, hp);
            self.available_food -= portion;
            eaten += portion;
        }
        if self.available_food < 0.0 {
            self.available_food = 0.0;
        }
        eaten
    }

    /// Carnivores hunt, fittest first, starting from the least fit herbivore.
    ///
    /// Each carnivore eats until it has had `F` or only prey at least as fit
    /// as itself remains. Killed herbivores are out of reach for every later
    /// carnivore and are removed once all carnivores have hunted. Returns the
    /// number of kills.
    pub fn feed_carnivores(&mut self, params: &Parameters, rng: &mut impl Rng) -> usize {
        let hp = &params.herbivore;
        let cp = &params.carnivore;
        if self.carnivores.is_empty() || self.herbivores.is_empty() {
            return 0;
        }

        // Stable sorts: equal fitness keeps list order.
        self.carnivores
            .sort_by(|a, b| b.fitness(cp).total_cmp(&a.fitness(cp)));
        self.herbivores
            .sort_by(|a, b| a.fitness(hp).total_cmp(&b.fitness(hp)));

        let mut killed = vec![false; self.herbivores.len()];
        let mut kills = 0;

        for carnivore in &mut self.carnivores {
            let mut eaten = 0.0;
            for (prey, dead) in self.herbivores.iter().zip(killed.iter_mut()) {
                if eaten >= cp.f {
                    break;
                }
                if *dead {
                    continue;
                }
                // Prey is sorted by fitness, so everything after is fitter too.
                if prey.fitness(hp) >= carnivore.fitness(cp) {
                    break;
                }
                let p = carnivore.kill_probability(prey, cp, hp);
                if rng.gen::<f64>() < p {
                    let meal = prey.weight.min(cp.f - eaten);
                    carnivore.feed(meal, cp);
                    eaten += meal;
                    *dead = true;
                    kills += 1;
                }
            }
        }

        let mut flags = killed.into_iter();
        self.herbivores
            .retain(|_| !flags.next().unwrap_or(false));
        kills
    }

    /// Every animal of `species` present before the pass may give birth
    /// once. Newborns join after the pass. Returns the number of births.
    pub fn reproduce(&mut self, species: Species, params: &Parameters, rng: &mut impl Rng) -> usize {
        let sp = params.species(species);
        let population = self.population_mut(species);
        let count = population.len();
        if count < 2 {
            return 0;
        }

        let newborns: Vec<Animal> = population
            .iter_mut()
            .filter_map(|parent| parent.attempt_birth(count, sp, rng))
            .collect();
        let births = newborns.len();
        population.extend(newborns);
        births
    }

    pub fn reproduce_herbivores(&mut self, params: &Parameters, rng: &mut impl Rng) -> usize {
        self.reproduce(Species::Herbivore, params, rng)
    }

    pub fn reproduce_carnivores(&mut self, params: &Parameters, rng: &mut impl Rng) -> usize {
        self.reproduce(Species::Carnivore, params, rng)
    }

    /// Indices of animals of `species` that have not moved this year and
    /// want to migrate. Draws one `attempt_move` per eligible animal.
    pub fn emigration_candidates(
        &self,
        species: Species,
        params: &Parameters,
        rng: &mut impl Rng,
    ) -> Vec<usize> {
        let sp = params.species(species);
        self.population(species)
            .iter()
            .enumerate()
            .filter(|(_, animal)| !animal.has_moved && animal.attempt_move(sp, rng))
            .map(|(i, _)| i)
            .collect()
    }

    /// Remove the animals at `indices` and return them. The remaining animals
    /// keep their relative order.
    pub fn take_emigrants(&mut self, species: Species, indices: &[usize]) -> Vec<Animal> {
        let population = self.population_mut(species);
        let mut leaving_mask = vec![false; population.len()];
        for &i in indices {
            if let Some(slot) = leaving_mask.get_mut(i) {
                *slot = true;
            }
        }

        let mut leaving = Vec::with_capacity(indices.len());
        let mut staying = Vec::with_capacity(population.len());
        for (animal, leaves) in population.drain(..).zip(leaving_mask) {
            if leaves {
                leaving.push(animal);
            } else {
                staying.push(animal);
            }
        }
        *population = staying;
        leaving
    }

    /// Accept a migrant and mark it as moved for the rest of the year.
    pub fn receive_immigrant(&mut self, mut animal: Animal) {
        animal.has_moved = true;
        self.add_animal(animal);
    }

    pub fn age_all(&mut self) {
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.age_by_one_year();
        }
    }

    pub fn lose_weight_all(&mut self, params: &Parameters) {
        for animal in &mut self.herbivores {
            animal.lose_natural_weight(&params.herbivore);
        }
        for animal in &mut self.carnivores {
            animal.lose_natural_weight(&params.carnivore);
        }
    }

    /// Draw death once for every animal and drop the ones that die.
    /// Returns the number of deaths.
    pub fn remove_dead(&mut self, params: &Parameters, rng: &mut impl Rng) -> usize {
        let before = self.total();
        let hp = &params.herbivore;
        let cp = &params.carnivore;
        self.herbivores.retain(|a| !a.attempt_death(hp, rng));
        self.carnivores.retain(|a| !a.attempt_death(cp, rng));
        before - self.total()
    }

    pub fn reset_has_moved(&mut self) {
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.has_moved = false;
        }
    }
}
