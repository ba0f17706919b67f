//! Individual animals and their yearly lifecycle rules.
//!
//! All rules are pure functions of the animal's own state, its species
//! parameters, and a random source handed in by the caller. Fitness is never
//! stored; it is recomputed from age and weight on every call.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::species::{Species, SpeciesParams};

/// A single herbivore or carnivore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub species: Species,
    pub age: u32,
    pub weight: f64,
    /// Set once the animal has migrated this year.
    pub has_moved: bool,
}

/// Logistic term used by the fitness formula.
///
/// `1 / (1 + exp(sign * phi * (x - x_half)))`
pub fn sigmoid(sign: f64, x: f64, x_half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (sign * phi * (x - x_half)).exp())
}

/// Probability that a predator with fitness `predator` kills prey with
/// fitness `prey`.
///
/// Zero when the prey is at least as fit, linear in the fitness gap below
/// `delta_phi_max`, and certain at or above it.
pub fn kill_probability(predator: f64, prey: f64, delta_phi_max: f64) -> f64 {
    let diff = predator - prey;
    if diff <= 0.0 {
        0.0
    } else if diff < delta_phi_max {
        diff / delta_phi_max
    } else {
        1.0
    }
}

impl Animal {
    pub fn new(species: Species, age: u32, weight: f64) -> Self {
        Self {
            species,
            age,
            weight,
            has_moved: false,
        }
    }

    pub fn herbivore(age: u32, weight: f64) -> Self {
        Self::new(Species::Herbivore, age, weight)
    }

    pub fn carnivore(age: u32, weight: f64) -> Self {
        Self::new(Species::Carnivore, age, weight)
    }

    /// Draw a birth weight from `Normal(w_birth, sigma_birth)`.
    pub fn sample_birth_weight(params: &SpeciesParams, rng: &mut impl Rng) -> f64 {
        match Normal::new(params.w_birth, params.sigma_birth) {
            Ok(normal) => normal.sample(rng),
            // Only reachable with a hand-built record holding a bad sigma.
            Err(_) => params.w_birth,
        }
    }

    pub fn age_by_one_year(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Yearly multiplicative weight decay by `eta`.
    pub fn lose_natural_weight(&mut self, params: &SpeciesParams) {
        self.weight -= params.eta * self.weight;
        if self.weight < 0.0 {
            self.weight = 0.0;
        }
    }

    pub fn fitness(&self, params: &SpeciesParams) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        sigmoid(1.0, self.age as f64, params.a_half, params.phi_age)
            * sigmoid(-1.0, self.weight, params.w_half, params.phi_weight)
    }

    /// Try to give birth given `same_sex_count` animals of this species in the
    /// cell (the parent included).
    ///
    /// On success the parent loses `xi * newborn.weight` and the newborn is
    /// returned. An underweight parent, a failed draw, or a newborn the parent
    /// cannot afford all yield `None` with the parent unchanged.
    pub fn attempt_birth(
        &mut self,
        same_sex_count: usize,
        params: &SpeciesParams,
        rng: &mut impl Rng,
    ) -> Option<Animal> {
        if self.weight < params.zeta * (params.w_birth + params.sigma_birth) {
            return None;
        }

        let others = same_sex_count.saturating_sub(1) as f64;
        let p = (params.gamma * self.fitness(params) * others).min(1.0);
        if rng.gen::<f64>() >= p {
            return None;
        }

        let birth_weight = Self::sample_birth_weight(params, rng);
        if birth_weight <= 0.0 {
            return None;
        }
        let cost = birth_weight * params.xi;
        if cost < self.weight {
            self.weight -= cost;
            Some(Animal::new(self.species, 0, birth_weight))
        } else {
            None
        }
    }

    /// Whether the animal dies this year.
    pub fn attempt_death(&self, params: &SpeciesParams, rng: &mut impl Rng) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        let p = params.omega * (1.0 - self.fitness(params));
        rng.gen::<f64>() < p
    }

    /// Whether the animal wants to migrate this year. The island decides
    /// where, and whether the move is legal.
    pub fn attempt_move(&self, params: &SpeciesParams, rng: &mut impl Rng) -> bool {
        rng.gen::<f64>() < params.mu * self.fitness(params)
    }

    /// Herbivore grazing: gain `beta` per unit of fodder eaten.
    pub fn feed(&mut self, amount: f64, params: &SpeciesParams) {
        self.weight += amount * params.beta;
    }

    /// Kill probability of this carnivore against `prey`.
    pub fn kill_probability(
        &self,
        prey: &Animal,
        own: &SpeciesParams,
        prey_params: &SpeciesParams,
    ) -> f64 {
        let Some(delta_phi_max) = own.delta_phi_max else {
            return 0.0;
        };
        kill_probability(self.fitness(own), prey.fitness(prey_params), delta_phi_max)
    }
}
