//! Integration tests for the annual cycle.
//!
//! Exercises: Geography → Island → placement → run_year / BioSim::simulate
//! → statistics and checkpoints.
//!
//! All tests are pure logic, seeded and headless.

use std::collections::BTreeMap;

use biosim_logic::animal::Animal;
use biosim_logic::cell::Cell;
use biosim_logic::island::Island;
use biosim_logic::params::Parameters;
use biosim_logic::persistence::{load_simulation, save_simulation};
use biosim_logic::population::PopulationSpec;
use biosim_logic::simulation::{BioSim, DEFAULT_GEOGRAPHY};
use biosim_logic::species::Species;
use biosim_logic::stats::{HistogramSpecs, PropertySample};
use biosim_logic::terrain::Terrain;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ── Helpers ────────────────────────────────────────────────────────────

const SMALL_ISLAND: &str = "
    WWWWWWW
    WLLHHDW
    WLLHHDW
    WLHDDLW
    WWWWWWW";

fn small_sim(seed: u64) -> BioSim {
    BioSim::new(
        SMALL_ISLAND,
        &[
            PopulationSpec::uniform((2, 2), Species::Herbivore, 40, 5, 20.0),
            PopulationSpec::uniform((3, 4), Species::Carnivore, 10, 5, 20.0),
        ],
        seed,
    )
    .unwrap()
}

/// Island-wide invariants that must hold between years.
fn assert_invariants(sim: &BioSim) {
    let params = sim.params();
    for ((row, col), cell) in sim.island().cells() {
        if !cell.is_passable() {
            assert_eq!(cell.total(), 0, "animals on water at ({row}, {col})");
        }
        for animal in cell.herbivores().iter().chain(cell.carnivores()) {
            let fitness = animal.fitness(params.species(animal.species));
            assert!(animal.weight >= 0.0, "negative weight at ({row}, {col})");
            assert!((0.0..=1.0).contains(&fitness), "fitness {fitness} out of range");
            if animal.weight == 0.0 {
                assert_eq!(fitness, 0.0);
            }
            assert!(!animal.has_moved, "has_moved left set at ({row}, {col})");
        }
        assert!(cell.herbivores().iter().all(|a| a.species == Species::Herbivore));
        assert!(cell.carnivores().iter().all(|a| a.species == Species::Carnivore));
    }
}

// ── Annual cycle ───────────────────────────────────────────────────────

#[test]
fn test_invariants_hold_over_many_years() {
    let mut sim = small_sim(2024);
    for _ in 0..40 {
        sim.simulate(1);
        assert_invariants(&sim);
    }
    assert_eq!(sim.history().len(), 40);
}

#[test]
fn test_default_island_runs() {
    let mut sim = BioSim::default_island(123).unwrap();
    sim.simulate(20);
    assert_invariants(&sim);
    let count = sim.num_animals_per_species();
    assert_eq!(count.total(), sim.num_animals());
    let distributed: usize = sim
        .animal_distribution()
        .iter()
        .map(|c| c.herbivores + c.carnivores)
        .sum();
    assert_eq!(distributed, sim.num_animals());
}

#[test]
fn test_history_tracks_counts() {
    let mut sim = small_sim(5);
    sim.simulate(10);
    let last = *sim.history().last().unwrap();
    let count = sim.num_animals_per_species();
    assert_eq!(last.year, 10);
    assert_eq!(last.herbivores, count.herbivores);
    assert_eq!(last.carnivores, count.carnivores);
}

#[test]
fn test_determinism_for_same_seed() {
    let mut a = small_sim(77);
    let mut b = small_sim(77);
    a.simulate(15);
    b.simulate(15);
    assert_eq!(a.history(), b.history());
    assert_eq!(a.island(), b.island());
}

#[test]
fn test_regrow_sets_capacity_regardless_of_prior_food() {
    let params = Parameters::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for (terrain, capacity) in [
        (Terrain::Lowland, 800.0),
        (Terrain::Highland, 300.0),
        (Terrain::Desert, 0.0),
    ] {
        let mut cell = Cell::new(terrain);
        cell.regrow_food(&params);
        assert_eq!(cell.available_food(), capacity);
        cell.add_animal(Animal::herbivore(5, 20.0));
        cell.feed_herbivores(&params, &mut rng);
        cell.regrow_food(&params);
        assert_eq!(cell.available_food(), capacity);
    }
}

#[test]
fn test_single_pair_never_reproduces() {
    let mut params = Parameters::default();
    let mut high_gamma = BTreeMap::new();
    high_gamma.insert("gamma".to_string(), 100.0);
    params.set_species_params(Species::Herbivore, &high_gamma).unwrap();
    params.set_species_params(Species::Carnivore, &high_gamma).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut cell = Cell::new(Terrain::Lowland);
    cell.add_animal(Animal::herbivore(5, 50.0));
    cell.add_animal(Animal::carnivore(5, 50.0));
    for _ in 0..20 {
        assert_eq!(cell.reproduce_herbivores(&params, &mut rng), 0);
        assert_eq!(cell.reproduce_carnivores(&params, &mut rng), 0);
    }
    assert_eq!(cell.total(), 2);
}

#[test]
fn test_scarce_fodder_is_shared_out() {
    let mut params = Parameters::default();
    let mut lowland = BTreeMap::new();
    lowland.insert("f_max".to_string(), 10.0);
    params.set_landscape_params(Terrain::Lowland, &lowland).unwrap();

    let mut cell = Cell::new(Terrain::Lowland);
    cell.add_animal(Animal::herbivore(5, 20.0));
    cell.add_animal(Animal::herbivore(5, 20.0));
    cell.regrow_food(&params);

    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let eaten = cell.feed_herbivores(&params, &mut rng);
    let gain: f64 = cell.herbivores().iter().map(|h| h.weight - 20.0).sum();
    assert_eq!(eaten, 10.0);
    assert!((gain - 10.0 * params.herbivore.beta).abs() < 1e-12);
    assert_eq!(cell.available_food(), 0.0);
}

#[test]
fn test_predation_only_removes_herbivores() {
    let params = Parameters::default();
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let mut cell = Cell::new(Terrain::Lowland);
    for _ in 0..30 {
        cell.add_animal(Animal::herbivore(40, 3.0));
    }
    for _ in 0..5 {
        cell.add_animal(Animal::carnivore(5, 20.0));
    }
    let kills = cell.feed_carnivores(&params, &mut rng);
    assert_eq!(cell.herbivores().len(), 30 - kills);
    assert_eq!(cell.carnivores().len(), 5);
}

#[test]
fn test_isolated_cells_keep_their_animals() {
    // Two lowland cells separated by water: nobody can cross.
    let map = "
        WWWWW
        WLWLW
        WWWWW";
    let mut sim = BioSim::new(
        map,
        &[PopulationSpec::uniform((2, 2), Species::Herbivore, 30, 5, 20.0)],
        3,
    )
    .unwrap();
    sim.simulate(10);
    let other = sim.island().cell((2, 4)).unwrap();
    assert_eq!(other.total(), 0);
}

#[test]
fn test_island_without_predators_grows() {
    let mut isl = Island::from_map("WWWW\nWLLW\nWWWW").unwrap();
    isl.place_population(&[PopulationSpec::uniform((2, 2), Species::Herbivore, 20, 5, 25.0)])
        .unwrap();
    let params = Parameters::default();
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut births = 0;
    for _ in 0..5 {
        births += isl.run_year(&params, &mut rng).births;
    }
    assert!(births > 0);
    assert_eq!(isl.population_count_by_species().carnivores, 0);
}

// ── Input formats ──────────────────────────────────────────────────────

#[test]
fn test_population_from_json() {
    let json = r#"[
        {"loc": [4, 4], "pop": [
            {"species": "Herbivore", "age": 5, "weight": 20.0},
            {"species": "Carnivore", "age": 3, "weight": 15.5}
        ]},
        {"loc": [10, 10], "pop": [{"species": "Herbivore", "age": 0, "weight": 8.0}]}
    ]"#;
    let records: Vec<PopulationSpec> = serde_json::from_str(json).unwrap();
    let sim = BioSim::new(DEFAULT_GEOGRAPHY, &records, 1).unwrap();
    let count = sim.num_animals_per_species();
    assert_eq!(count.herbivores, 2);
    assert_eq!(count.carnivores, 1);
}

#[test]
fn test_parameter_overrides_from_json() {
    let overrides: BTreeMap<String, f64> =
        serde_json::from_str(r#"{"mu": 0.0, "F": 15.0}"#).unwrap();
    let mut sim = small_sim(1);
    sim.set_animal_parameters(Species::Herbivore, &overrides).unwrap();
    assert_eq!(sim.params().herbivore.mu, 0.0);
    assert_eq!(sim.params().herbivore.f, 15.0);

    let bad: BTreeMap<String, f64> = serde_json::from_str(r#"{"mu": 0.5, "eta": 2.0}"#).unwrap();
    assert!(sim.set_animal_parameters(Species::Herbivore, &bad).is_err());
    assert_eq!(sim.params().herbivore.mu, 0.0);
}

// ── Statistics and checkpoints ─────────────────────────────────────────

#[test]
fn test_histograms_match_population() {
    let mut sim = small_sim(8);
    sim.simulate(5);
    let count = sim.num_animals_per_species();
    let specs = HistogramSpecs::default();
    for species in Species::ALL {
        let hist = sim.property_histograms(species, &specs);
        assert_eq!(hist.weight.total(), count.get(species));
        assert_eq!(hist.fitness.total(), count.get(species));
        let sample = PropertySample::collect(sim.island(), sim.params(), species);
        assert_eq!(sample.len(), count.get(species));
    }
}

#[test]
fn test_resumed_run_matches_uninterrupted_run() {
    let mut straight = small_sim(404);
    straight.simulate(12);

    let mut first_half = small_sim(404);
    first_half.simulate(6);
    let mut buffer = Vec::new();
    save_simulation(&mut buffer, &first_half).unwrap();
    let mut resumed = load_simulation(buffer.as_slice()).unwrap();
    resumed.simulate(6);

    assert_eq!(resumed.year(), 12);
    assert_eq!(resumed.history(), straight.history());
    assert_eq!(resumed.island(), straight.island());
}
