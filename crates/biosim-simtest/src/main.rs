//! BioSim Headless Simulation Harness
//!
//! Runs the island ecosystem from the command line, saves and resumes
//! checkpoints, and sweeps the annual cycle for invariant violations.
//! Runs entirely in-process: no plotting, no rendering.
//!
//! Usage:
//!   cargo run -p biosim-simtest -- run --years 50 --seed 1
//!   cargo run -p biosim-simtest -- resume --checkpoint sim.ckpt --years 50
//!   cargo run -p biosim-simtest -- validate --years 100 --verbose

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use biosim_logic::population::PopulationSpec;
use biosim_logic::simulation::{default_population, BioSim, DEFAULT_GEOGRAPHY};
use biosim_logic::species::Species;
use biosim_logic::stats::PropertySample;
use biosim_logic::terrain::Terrain;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "biosim-simtest")]
#[command(version)]
#[command(about = "Headless harness for the BioSim island ecosystem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Number of years to simulate
        #[arg(short, long, default_value = "50")]
        years: u32,

        /// Random seed for reproducibility
        #[arg(short, long, default_value = "1")]
        seed: u64,

        /// Geography text file (default: built-in island)
        #[arg(short, long)]
        geography: Option<PathBuf>,

        /// Initial population JSON file (default: built-in population)
        #[arg(short, long)]
        population: Option<PathBuf>,

        /// Herbivore parameter overrides (JSON object)
        #[arg(long)]
        herbivore_params: Option<PathBuf>,

        /// Carnivore parameter overrides (JSON object)
        #[arg(long)]
        carnivore_params: Option<PathBuf>,

        /// Landscape overrides, keyed by terrain (JSON object)
        #[arg(long)]
        landscape_params: Option<PathBuf>,

        /// Write a checkpoint here when done
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Resume a simulation from a checkpoint
    Resume {
        /// Checkpoint file to resume from
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Number of additional years
        #[arg(short, long, default_value = "50")]
        years: u32,

        /// Write a checkpoint here when done
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Run the default island and check invariants every year
    Validate {
        /// Number of years to sweep
        #[arg(short, long, default_value = "100")]
        years: u32,

        /// Random seed
        #[arg(short, long, default_value = "1")]
        seed: u64,

        /// Print passing checks too
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            years,
            seed,
            geography,
            population,
            herbivore_params,
            carnivore_params,
            landscape_params,
            save,
        } => {
            let inputs = RunInputs {
                geography,
                population,
                herbivore_params,
                carnivore_params,
                landscape_params,
            };
            let mut sim = build_simulation(&inputs, seed)?;
            run_years(&mut sim, years, save.as_deref())
        }

        Commands::Resume {
            checkpoint,
            years,
            save,
        } => {
            println!("Resuming from: {:?}", checkpoint);
            let mut sim = BioSim::load_checkpoint(&checkpoint)?;
            println!("Checkpoint at year {} (seed {})", sim.year(), sim.seed());
            run_years(&mut sim, years, save.as_deref())
        }

        Commands::Validate {
            years,
            seed,
            verbose,
        } => {
            if !validate(years, seed, verbose)? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

// ── Run / resume ────────────────────────────────────────────────────────

struct RunInputs {
    geography: Option<PathBuf>,
    population: Option<PathBuf>,
    herbivore_params: Option<PathBuf>,
    carnivore_params: Option<PathBuf>,
    landscape_params: Option<PathBuf>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e).into())
}

fn build_simulation(inputs: &RunInputs, seed: u64) -> Result<BioSim, Box<dyn Error>> {
    let geography = match &inputs.geography {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_GEOGRAPHY.to_string(),
    };
    let population: Vec<PopulationSpec> = match &inputs.population {
        Some(path) => read_json(path)?,
        None => default_population(),
    };

    let mut sim = BioSim::new(&geography, &population, seed)?;

    for (species, path) in [
        (Species::Herbivore, &inputs.herbivore_params),
        (Species::Carnivore, &inputs.carnivore_params),
    ] {
        if let Some(path) = path {
            let overrides: BTreeMap<String, f64> = read_json(path)?;
            sim.set_animal_parameters(species, &overrides)?;
        }
    }

    if let Some(path) = &inputs.landscape_params {
        let by_terrain: BTreeMap<String, BTreeMap<String, f64>> = read_json(path)?;
        for (name, overrides) in &by_terrain {
            let terrain: Terrain = name.parse()?;
            sim.set_landscape_parameters(terrain, overrides)?;
        }
    }

    Ok(sim)
}

fn run_years(sim: &mut BioSim, years: u32, save: Option<&Path>) -> Result<(), Box<dyn Error>> {
    println!("=== BioSim: {} years from year {} ===\n", years, sim.year());
    println!("{}\n", sim.island().geography());
    println!("{:>6} {:>11} {:>11}", "year", "herbivores", "carnivores");

    for _ in 0..years {
        let record = sim.step();
        println!(
            "{:>6} {:>11} {:>11}",
            record.year, record.herbivores, record.carnivores
        );
    }

    println!();
    for species in Species::ALL {
        let sample = PropertySample::collect(sim.island(), sim.params(), species);
        match (sample.mean_age(), sample.mean_weight(), sample.mean_fitness()) {
            (Some(age), Some(weight), Some(fitness)) => println!(
                "  {:<10} n={:<6} mean age {:>5.1}  weight {:>5.1}  fitness {:.3}",
                species.name(),
                sample.len(),
                age,
                weight,
                fitness
            ),
            _ => println!("  {:<10} extinct", species.name()),
        }
    }

    if let Some(path) = save {
        sim.save_checkpoint(path)?;
        println!("\nCheckpoint written to {:?}", path);
    }
    Ok(())
}

// ── Validation sweep ────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

/// Tally of one invariant over the whole sweep.
#[derive(Default)]
struct Check {
    violations: usize,
    first: Option<String>,
}

impl Check {
    fn record(&mut self, ok: bool, detail: impl FnOnce() -> String) {
        if !ok {
            self.violations += 1;
            if self.first.is_none() {
                self.first = Some(detail());
            }
        }
    }

    fn into_result(self, name: &str, ok_detail: &str) -> TestResult {
        TestResult {
            name: name.into(),
            passed: self.violations == 0,
            detail: match self.first {
                None => ok_detail.into(),
                Some(first) => format!("{} violations, first: {}", self.violations, first),
            },
        }
    }
}

fn validate(years: u32, seed: u64, verbose: bool) -> Result<bool, Box<dyn Error>> {
    println!("=== BioSim Invariant Sweep ===\n");
    println!("--- Default island, seed {}, {} years ---", seed, years);

    let mut sim = BioSim::default_island(seed)?;
    let mut weight = Check::default();
    let mut fitness = Check::default();
    let mut moved = Check::default();
    let mut water = Check::default();
    let mut counts = Check::default();

    for _ in 0..years {
        let record = sim.step();
        let year = record.year;
        let params = sim.params();

        for ((row, col), cell) in sim.island().cells() {
            water.record(cell.is_passable() || cell.total() == 0, || {
                format!("year {}: {} animals on water at ({}, {})", year, cell.total(), row, col)
            });
            for animal in cell.herbivores().iter().chain(cell.carnivores()) {
                let phi = animal.fitness(params.species(animal.species));
                weight.record(animal.weight >= 0.0, || {
                    format!("year {}: weight {} at ({}, {})", year, animal.weight, row, col)
                });
                fitness.record((0.0..=1.0).contains(&phi) && (animal.weight > 0.0 || phi == 0.0), || {
                    format!("year {}: fitness {} at ({}, {})", year, phi, row, col)
                });
                moved.record(!animal.has_moved, || {
                    format!("year {}: has_moved still set at ({}, {})", year, row, col)
                });
            }
        }

        let live = sim.num_animals_per_species();
        counts.record(
            live.herbivores == record.herbivores && live.carnivores == record.carnivores,
            || format!("year {}: history disagrees with island", year),
        );
    }

    let results = vec![
        weight.into_result("weight_non_negative", "every weight >= 0"),
        fitness.into_result("fitness_in_unit_interval", "every fitness in [0, 1]"),
        moved.into_result("has_moved_cleared", "migration flags reset every year"),
        water.into_result("water_empty", "no animals on water"),
        counts.into_result("history_matches_island", "yearly records match head counts"),
        TestResult {
            name: "history_length".into(),
            passed: sim.history().len() == years as usize,
            detail: format!("{} yearly records", sim.history().len()),
        },
    ];

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    let final_count = sim.num_animals_per_species();
    println!(
        "\n  final population: {} herbivores, {} carnivores",
        final_count.herbivores, final_count.carnivores
    );
    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    Ok(failed == 0)
}
