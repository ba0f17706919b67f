//! Island-wide samples of fitness, age, and weight, binned into histograms
//! for plotting front-ends.

use serde::{Deserialize, Serialize};

use crate::island::Island;
use crate::params::Parameters;
use crate::species::Species;

/// Upper edge and bin width of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub max: f64,
    pub delta: f64,
}

/// Upper bound on the number of bins a spec may ask for.
pub const MAX_BINS: usize = 10_000;

impl HistogramSpec {
    /// `ceil(max / delta)`, capped at [`MAX_BINS`]. A spec with a
    /// non-finite or non-positive `max` or `delta` gets a single bin.
    pub fn bins(&self) -> usize {
        let finite = self.max.is_finite() && self.delta.is_finite();
        if !finite || self.max <= 0.0 || self.delta <= 0.0 {
            return 1;
        }
        let ratio = (self.max / self.delta).ceil();
        if ratio >= MAX_BINS as f64 {
            MAX_BINS
        } else {
            (ratio as usize).max(1)
        }
    }
}

/// Bin specs for the three tracked properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpecs {
    pub fitness: HistogramSpec,
    pub age: HistogramSpec,
    pub weight: HistogramSpec,
}

impl Default for HistogramSpecs {
    fn default() -> Self {
        Self {
            fitness: HistogramSpec {
                max: 1.0,
                delta: 0.05,
            },
            age: HistogramSpec {
                max: 60.0,
                delta: 2.0,
            },
            weight: HistogramSpec {
                max: 60.0,
                delta: 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub spec: HistogramSpec,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `spec.bins()` bins of width `delta`.
    /// Values at or above `max` land in the last bin, negatives in the first.
    pub fn from_values(values: &[f64], spec: HistogramSpec) -> Self {
        let mut counts = vec![0; spec.bins()];
        let last = counts.len() - 1;
        for &v in values {
            let bin = if spec.delta > 0.0 && v > 0.0 {
                ((v / spec.delta).floor() as usize).min(last)
            } else {
                0
            };
            counts[bin] += 1;
        }
        Self { spec, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Lower edge of every bin.
    pub fn edges(&self) -> Vec<f64> {
        (0..self.counts.len())
            .map(|i| i as f64 * self.spec.delta)
            .collect()
    }
}

/// Fitness, age, and weight of every animal of one species.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySample {
    pub fitness: Vec<f64>,
    pub age: Vec<f64>,
    pub weight: Vec<f64>,
}

impl PropertySample {
    pub fn collect(island: &Island, params: &Parameters, species: Species) -> Self {
        let sp = params.species(species);
        let mut sample = Self::default();
        for animal in island.animals().filter(|a| a.species == species) {
            sample.fitness.push(animal.fitness(sp));
            sample.age.push(animal.age as f64);
            sample.weight.push(animal.weight);
        }
        sample
    }

    pub fn len(&self) -> usize {
        self.fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty()
    }

    pub fn mean_weight(&self) -> Option<f64> {
        mean(&self.weight)
    }

    pub fn mean_age(&self) -> Option<f64> {
        mean(&self.age)
    }

    pub fn mean_fitness(&self) -> Option<f64> {
        mean(&self.fitness)
    }

    pub fn histograms(&self, specs: &HistogramSpecs) -> PropertyHistograms {
        PropertyHistograms {
            fitness: Histogram::from_values(&self.fitness, specs.fitness),
            age: Histogram::from_values(&self.age, specs.age),
            weight: Histogram::from_values(&self.weight, specs.weight),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyHistograms {
    pub fitness: Histogram,
    pub age: Histogram,
    pub weight: Histogram,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
