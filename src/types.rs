// src/types.rs
//
// Basic shared types for the ADDF simulator: sector state, agent actions,
// observation layers, call-to-action records and the index error raised
// when a table lookup falls outside its bounds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discretized observation bucket in `[0, n_observation)`.
pub type Observation = usize;

/// Sector index in `[0, n_sector)`.
pub type SectorId = usize;

/// Zero-based simulated day.
pub type Day = u64;

/// Hidden ground-truth state of a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectorState {
    NoStress,
    Stress,
}

impl SectorState {
    pub fn from_index(i: usize) -> Self {
        if i == 0 {
            SectorState::NoStress
        } else {
            SectorState::Stress
        }
    }

    pub fn index(self) -> usize {
        match self {
            SectorState::NoStress => 0,
            SectorState::Stress => 1,
        }
    }

    pub fn is_stressed(self) -> bool {
        matches!(self, SectorState::Stress)
    }
}

/// Action chosen by a learning agent for one observation.
///
/// `Act` on the fast track means "flag this sector for inspection"; on the
/// slow track it is the verdict "stress present".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    NoAction,
    Act,
}

impl Action {
    /// Number of actions in the action space.
    pub const COUNT: usize = 2;

    pub const ALL: [Action; Action::COUNT] = [Action::NoAction, Action::Act];

    pub fn index(self) -> usize {
        match self {
            Action::NoAction => 0,
            Action::Act => 1,
        }
    }

    pub fn from_index(i: usize) -> Result<Self, IndexError> {
        match i {
            0 => Ok(Action::NoAction),
            1 => Ok(Action::Act),
            _ => Err(IndexError::Action {
                index: i,
                len: Action::COUNT,
            }),
        }
    }

    /// Numeric value used by the reward shaping (0 or 1).
    pub fn value(self) -> f64 {
        self.index() as f64
    }

    pub fn is_act(self) -> bool {
        matches!(self, Action::Act)
    }
}

/// Observation fidelity tier. Layer 1 is the finest; higher layers are
/// coarser and discriminate stress less reliably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Layer(pub u8);

impl Layer {
    /// Finest layer, used by the slow agent.
    pub const FINE: Layer = Layer(1);
    /// Coarse layer, used by the fast agent.
    pub const COARSE: Layer = Layer(2);
    /// Coarsest layer carried by the observation model.
    pub const COARSEST: Layer = Layer(3);

    pub const ALL: [Layer; 3] = [Layer::FINE, Layer::COARSE, Layer::COARSEST];
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Call-to-action raised by the fast agent for one sector.
///
/// Queued for the slow agent; never mutated while queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaRecord {
    pub observation: Observation,
    pub action: Action,
    pub sector: SectorId,
}

/// A table lookup with an index outside its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    Observation { index: usize, len: usize },
    Action { index: usize, len: usize },
    Layer { layer: u8 },
    Sector { index: usize, len: usize },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Observation { index, len } => {
                write!(f, "observation {} out of range (n_observation = {})", index, len)
            }
            IndexError::Action { index, len } => {
                write!(f, "action {} out of range ({} actions)", index, len)
            }
            IndexError::Layer { layer } => {
                write!(f, "observation layer {} does not exist (valid: 1..=3)", layer)
            }
            IndexError::Sector { index, len } => {
                write!(f, "sector {} out of range (n_sector = {})", index, len)
            }
        }
    }
}

impl std::error::Error for IndexError {}
