// src/environment.rs
//
// Hidden-state generative environment (the "crop field").
//
// - ObservationModel: per-layer noisy observation distributions.
// - TransitionModel: day-indexed state transition distributions; state 0
//   grows stickier as the season progresses.
// - CropField: owns the per-sector hidden state and the day counter.
//
// All randomness is drawn from the caller-supplied RNG so a seeded run is
// fully reproducible.

use rand::Rng;

use crate::config::ConfigError;
use crate::types::{Day, IndexError, Layer, Observation, SectorId, SectorState};

/// Number of day-indexed transition tables (one growing season).
pub const TRANSITION_HORIZON: usize = 24;

/// True-positive mass of the given layer: `0.85 - 0.05 * layer`.
pub fn true_likelihood(layer: Layer) -> f64 {
    0.85 - f64::from(layer.0) * 0.05
}

/// Inverse-CDF sample from a discrete distribution.
///
/// Subtracts each probability from a uniform draw until the remainder is
/// non-positive and returns that index. Falls back to the last index if
/// rounding leaves a positive remainder.
pub fn sample_index<R: Rng + ?Sized>(distribution: &[f64], rng: &mut R) -> usize {
    let mut remainder: f64 = rng.gen();
    for (i, p) in distribution.iter().enumerate() {
        remainder -= p;
        if remainder <= 0.0 {
            return i;
        }
    }
    distribution.len().saturating_sub(1)
}

/// Observation distributions for one fidelity layer.
#[derive(Debug, Clone)]
pub struct LayerDistributions {
    /// P(observation | no stress).
    pub no_stress: Vec<f64>,
    /// P(observation | stress).
    pub stress: Vec<f64>,
}

impl LayerDistributions {
    fn build(layer: Layer, n_observation: usize) -> Self {
        let tl = true_likelihood(layer);
        let n = n_observation as f64;

        // Lower buckets share the non-true mass in proportion to (i / n).
        let raw: Vec<f64> = (1..n_observation).map(|i| (i as f64 / n) * (1.0 - tl)).collect();
        let raw_total: f64 = raw.iter().sum();

        let mut stress: Vec<f64> = raw.iter().map(|w| w / raw_total * (1.0 - tl)).collect();
        stress.push(tl);

        let no_stress: Vec<f64> = stress.iter().rev().copied().collect();

        Self { no_stress, stress }
    }

    pub fn given(&self, state: SectorState) -> &[f64] {
        match state {
            SectorState::NoStress => &self.no_stress,
            SectorState::Stress => &self.stress,
        }
    }
}

/// Layered stochastic observation function. Immutable once built.
#[derive(Debug, Clone)]
pub struct ObservationModel {
    n_observation: usize,
    layers: Vec<LayerDistributions>,
}

impl ObservationModel {
    pub fn new(n_observation: usize) -> Self {
        let layers = Layer::ALL
            .iter()
            .map(|&layer| LayerDistributions::build(layer, n_observation))
            .collect();
        Self {
            n_observation,
            layers,
        }
    }

    pub fn n_observation(&self) -> usize {
        self.n_observation
    }

    pub fn layer(&self, layer: Layer) -> Result<&LayerDistributions, IndexError> {
        (layer.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.layers.get(i))
            .ok_or(IndexError::Layer { layer: layer.0 })
    }

    pub fn distribution(&self, layer: Layer, state: SectorState) -> Result<&[f64], IndexError> {
        Ok(self.layer(layer)?.given(state))
    }
}

/// Day-indexed stochastic transition function. Immutable once built.
#[derive(Debug, Clone)]
pub struct TransitionModel {
    /// `tables[d][s]` is the next-state distribution on day index `d` from
    /// state `s`.
    tables: Vec<[[f64; 2]; 2]>,
}

impl Default for TransitionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionModel {
    pub fn new() -> Self {
        let prior = [0.5_f64, 0.5];
        let tables = (1..=TRANSITION_HORIZON)
            .map(|day| {
                let stay = prior[0] * day as f64;
                let total = stay + prior[1];
                let from_no_stress = [stay / total, prior[1] / total];
                let from_stress = [from_no_stress[1], from_no_stress[0]];
                [from_no_stress, from_stress]
            })
            .collect();
        Self { tables }
    }

    /// Table index used on `day`: clamped to the last table once the
    /// season outgrows the horizon.
    pub fn day_index(day: Day) -> usize {
        (day as usize).min(TRANSITION_HORIZON - 1)
    }

    pub fn distribution(&self, day: Day, state: SectorState) -> &[f64; 2] {
        &self.tables[Self::day_index(day)][state.index()]
    }

    pub fn horizon(&self) -> usize {
        self.tables.len()
    }
}

/// Simulated field of independently evolving sectors.
#[derive(Debug, Clone)]
pub struct CropField {
    sectors: Vec<SectorState>,
    observation: ObservationModel,
    transition: TransitionModel,
    day: Day,
}

impl CropField {
    /// Build the observation/transition models and draw initial states.
    pub fn new<R: Rng + ?Sized>(
        n_sector: usize,
        n_observation: usize,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        check_shape(n_sector, n_observation)?;

        let sectors = (0..n_sector)
            .map(|_| {
                let u: f64 = rng.gen();
                SectorState::from_index(u.round() as usize)
            })
            .collect();

        Self::with_states(sectors, n_observation)
    }

    /// Build a field with explicit initial states (day 0).
    pub fn with_states(
        sectors: Vec<SectorState>,
        n_observation: usize,
    ) -> Result<Self, ConfigError> {
        check_shape(sectors.len(), n_observation)?;
        Ok(Self {
            sectors,
            observation: ObservationModel::new(n_observation),
            transition: TransitionModel::new(),
            day: 0,
        })
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn n_sector(&self) -> usize {
        self.sectors.len()
    }

    pub fn n_observation(&self) -> usize {
        self.observation.n_observation()
    }

    pub fn sectors(&self) -> &[SectorState] {
        &self.sectors
    }

    pub fn sector_state(&self, sector: SectorId) -> Result<SectorState, IndexError> {
        self.sectors.get(sector).copied().ok_or(IndexError::Sector {
            index: sector,
            len: self.sectors.len(),
        })
    }

    pub fn observation_model(&self) -> &ObservationModel {
        &self.observation
    }

    pub fn transition_model(&self) -> &TransitionModel {
        &self.transition
    }

    /// One observation per sector at `layer`. Does not touch hidden state.
    pub fn observe_sectors<R: Rng + ?Sized>(
        &self,
        layer: Layer,
        rng: &mut R,
    ) -> Result<Vec<Observation>, IndexError> {
        let dists = self.observation.layer(layer)?;
        Ok(self
            .sectors
            .iter()
            .map(|&state| sample_index(dists.given(state), rng))
            .collect())
    }

    /// Observation of a single sector at `layer`.
    pub fn observe_sector<R: Rng + ?Sized>(
        &self,
        layer: Layer,
        sector: SectorId,
        rng: &mut R,
    ) -> Result<Observation, IndexError> {
        let state = self.sector_state(sector)?;
        let dist = self.observation.distribution(layer, state)?;
        Ok(sample_index(dist, rng))
    }

    /// Advance every sector one day. All sectors transition from the same
    /// pre-step snapshot.
    pub fn iterate_states<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let next: Vec<SectorState> = self
            .sectors
            .iter()
            .map(|&state| {
                SectorState::from_index(sample_index(
                    self.transition.distribution(self.day, state),
                    rng,
                ))
            })
            .collect();
        self.sectors = next;
        self.day += 1;
    }
}

fn check_shape(n_sector: usize, n_observation: usize) -> Result<(), ConfigError> {
    if n_sector < 1 {
        return Err(ConfigError::SectorCount(n_sector));
    }
    if n_observation < 2 {
        return Err(ConfigError::ObservationGranularity(n_observation));
    }
    Ok(())
}
