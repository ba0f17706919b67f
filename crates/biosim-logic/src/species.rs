//! Species tags and their shared parameter records.
//!
//! Every individual of a species reads the same `SpeciesParams`. Overrides go
//! through [`SpeciesParams::update`], which validates the whole map before a
//! single field changes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two species living on the island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn name(self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(ParamError::UnknownSpecies(other.to_string())),
        }
    }
}

/// Rejected parameter override.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("unknown species: {0}")]
    UnknownSpecies(String),
    #[error("invalid parameter name for {species}: {key}")]
    UnknownKey { species: Species, key: String },
    #[error("{key} cannot be negative (got {value})")]
    Negative { key: String, value: f64 },
    #[error("{key} must be a finite number")]
    NotFinite { key: String },
    #[error("eta must be <= 1 (got {0})")]
    EtaTooLarge(f64),
    #[error("DeltaPhiMax must be positive (got {0})")]
    NonPositiveDeltaPhiMax(f64),
}

/// Biological constants for one species.
///
/// Field names follow the override keys except `f` (`"F"`) and
/// `delta_phi_max` (`"DeltaPhiMax"`, carnivores only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    pub w_birth: f64,
    pub sigma_birth: f64,
    pub beta: f64,
    pub eta: f64,
    pub a_half: f64,
    pub phi_age: f64,
    pub w_half: f64,
    pub phi_weight: f64,
    pub mu: f64,
    pub gamma: f64,
    pub zeta: f64,
    pub xi: f64,
    pub omega: f64,
    /// Appetite: fodder or prey mass eaten per year at most.
    pub f: f64,
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            f: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    /// Keys accepted by [`update`](Self::update) for this parameter set.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = vec![
            "w_birth",
            "sigma_birth",
            "beta",
            "eta",
            "a_half",
            "phi_age",
            "w_half",
            "phi_weight",
            "mu",
            "gamma",
            "zeta",
            "xi",
            "omega",
            "F",
        ];
        if self.delta_phi_max.is_some() {
            keys.push("DeltaPhiMax");
        }
        keys
    }

    /// Apply overrides. Nothing changes unless every entry is valid.
    pub fn update(
        &mut self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), ParamError> {
        let known = self.keys();
        for (key, &value) in overrides {
            if !known.contains(&key.as_str()) {
                return Err(ParamError::UnknownKey {
                    species,
                    key: key.clone(),
                });
            }
            validate_value(key, value)?;
        }

        for (key, &value) in overrides {
            if let Some(slot) = self.slot_mut(key) {
                *slot = value;
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
        match key {
            "w_birth" => Some(&mut self.w_birth),
            "sigma_birth" => Some(&mut self.sigma_birth),
            "beta" => Some(&mut self.beta),
            "eta" => Some(&mut self.eta),
            "a_half" => Some(&mut self.a_half),
            "phi_age" => Some(&mut self.phi_age),
            "w_half" => Some(&mut self.w_half),
            "phi_weight" => Some(&mut self.phi_weight),
            "mu" => Some(&mut self.mu),
            "gamma" => Some(&mut self.gamma),
            "zeta" => Some(&mut self.zeta),
            "xi" => Some(&mut self.xi),
            "omega" => Some(&mut self.omega),
            "F" => Some(&mut self.f),
            "DeltaPhiMax" => self.delta_phi_max.as_mut(),
            _ => None,
        }
    }
}

fn validate_value(key: &str, value: f64) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite {
            key: key.to_string(),
        });
    }
    match key {
        "eta" if value > 1.0 => return Err(ParamError::EtaTooLarge(value)),
        "DeltaPhiMax" if value <= 0.0 => return Err(ParamError::NonPositiveDeltaPhiMax(value)),
        _ => {}
    }
    if value < 0.0 {
        return Err(ParamError::Negative {
            key: key.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_defaults_differ_per_species() {
        let h = SpeciesParams::herbivore();
        let c = SpeciesParams::carnivore();
        assert_eq!(h.f, 10.0);
        assert_eq!(c.f, 50.0);
        assert!(h.delta_phi_max.is_none());
        assert_eq!(c.delta_phi_max, Some(10.0));
    }

    #[test]
    fn test_update_applies_valid_keys() {
        let mut p = SpeciesParams::herbivore();
        p.update(Species::Herbivore, &overrides(&[("F", 20.0), ("mu", 0.5)]))
            .unwrap();
        assert_eq!(p.f, 20.0);
        assert_eq!(p.mu, 0.5);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut p = SpeciesParams::herbivore();
        let err = p
            .update(Species::Herbivore, &overrides(&[("speed", 1.0)]))
            .unwrap_err();
        assert!(matches!(err, ParamError::UnknownKey { .. }));
    }

    #[test]
    fn test_herbivore_has_no_delta_phi_max() {
        let mut p = SpeciesParams::herbivore();
        let err = p
            .update(Species::Herbivore, &overrides(&[("DeltaPhiMax", 5.0)]))
            .unwrap_err();
        assert!(matches!(err, ParamError::UnknownKey { .. }));
    }

    #[test]
    fn test_negative_rejected() {
        let mut p = SpeciesParams::carnivore();
        let err = p
            .update(Species::Carnivore, &overrides(&[("beta", -0.1)]))
            .unwrap_err();
        assert!(matches!(err, ParamError::Negative { .. }));
    }

    #[test]
    fn test_eta_bound() {
        let mut p = SpeciesParams::carnivore();
        assert_eq!(
            p.update(Species::Carnivore, &overrides(&[("eta", 1.5)])),
            Err(ParamError::EtaTooLarge(1.5))
        );
        p.update(Species::Carnivore, &overrides(&[("eta", 1.0)]))
            .unwrap();
        assert_eq!(p.eta, 1.0);
    }

    #[test]
    fn test_delta_phi_max_must_be_positive() {
        let mut p = SpeciesParams::carnivore();
        assert_eq!(
            p.update(Species::Carnivore, &overrides(&[("DeltaPhiMax", 0.0)])),
            Err(ParamError::NonPositiveDeltaPhiMax(0.0))
        );
    }

    #[test]
    fn test_rejected_update_is_all_or_nothing() {
        let mut p = SpeciesParams::herbivore();
        let before = p.clone();
        let result = p.update(
            Species::Herbivore,
            &overrides(&[("F", 99.0), ("gamma", -1.0)]),
        );
        assert!(result.is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_nan_rejected() {
        let mut p = SpeciesParams::herbivore();
        let err = p
            .update(Species::Herbivore, &overrides(&[("xi", f64::NAN)]))
            .unwrap_err();
        assert!(matches!(err, ParamError::NotFinite { .. }));
    }

    #[test]
    fn test_species_from_str() {
        assert_eq!("Herbivore".parse::<Species>().unwrap(), Species::Herbivore);
        assert_eq!("Carnivore".parse::<Species>().unwrap(), Species::Carnivore);
        assert!("Omnivore".parse::<Species>().is_err());
    }
}
