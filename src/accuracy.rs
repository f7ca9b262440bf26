// src/accuracy.rs
//
// Confusion-matrix bookkeeping for both agents.
//
// One row per agent, four counters: true positive, true negative, false
// positive, false negative. Counts only ever increase; a season reset does
// not touch them.

use serde::{Deserialize, Serialize};

use crate::types::{Action, SectorState};

/// Which agent a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    Fast,
    Slow,
}

impl AgentRole {
    pub const ALL: [AgentRole; 2] = [AgentRole::Fast, AgentRole::Slow];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Fast => "fast",
            AgentRole::Slow => "slow",
        }
    }

    fn row(self) -> usize {
        match self {
            AgentRole::Fast => 0,
            AgentRole::Slow => 1,
        }
    }
}

/// Outcome of comparing one guess against the ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

impl Outcome {
    pub fn classify(guess: Action, truth: SectorState) -> Self {
        let g = guess.index();
        let t = truth.index();
        if g == t {
            if g > 0 {
                Outcome::TruePositive
            } else {
                Outcome::TrueNegative
            }
        } else if g > t {
            Outcome::FalsePositive
        } else {
            Outcome::FalseNegative
        }
    }

    fn column(self) -> usize {
        match self {
            Outcome::TruePositive => 0,
            Outcome::TrueNegative => 1,
            Outcome::FalsePositive => 2,
            Outcome::FalseNegative => 3,
        }
    }
}

/// Confusion counts for one agent, in `[tp, tn, fp, fn]` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: u64,
    pub true_negative: u64,
    pub false_positive: u64,
    pub false_negative: u64,
}

impl ConfusionCounts {
    pub fn as_array(&self) -> [u64; 4] {
        [
            self.true_positive,
            self.true_negative,
            self.false_positive,
            self.false_negative,
        ]
    }

    pub fn total(&self) -> u64 {
        self.as_array().iter().sum()
    }

    pub fn correct(&self) -> u64 {
        self.true_positive + self.true_negative
    }

    /// Ground-truth stressed cases seen.
    pub fn positives(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    /// Ground-truth unstressed cases seen.
    pub fn negatives(&self) -> u64 {
        self.true_negative + self.false_positive
    }

    /// Cases the agent flagged.
    pub fn flagged(&self) -> u64 {
        self.true_positive + self.false_positive
    }

    /// Cases the agent let through.
    pub fn passed(&self) -> u64 {
        self.true_negative + self.false_negative
    }

    /// `(tp + tn) / total * 100`; zero before any decision.
    pub fn accuracy_pct(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64 * 100.0
        }
    }
}

/// 2x4 accuracy table (fast row, slow row).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyMatrix {
    counts: [[u64; 4]; 2],
}

impl AccuracyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, role: AgentRole, guess: Action, truth: SectorState) -> Outcome {
        let outcome = Outcome::classify(guess, truth);
        self.counts[role.row()][outcome.column()] += 1;
        outcome
    }

    pub fn row(&self, role: AgentRole) -> ConfusionCounts {
        let [tp, tn, fp, fneg] = self.counts[role.row()];
        ConfusionCounts {
            true_positive: tp,
            true_negative: tn,
            false_positive: fp,
            false_negative: fneg,
        }
    }

    pub fn as_rows(&self) -> [[u64; 4]; 2] {
        self.counts
    }

    pub fn summary(&self) -> AccuracySummary {
        AccuracySummary {
            fast: AgentAccuracy::from_counts(self.row(AgentRole::Fast)),
            slow: AgentAccuracy::from_counts(self.row(AgentRole::Slow)),
        }
    }
}

/// Per-agent report values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentAccuracy {
    pub counts: ConfusionCounts,
    pub accuracy_pct: f64,
    pub decisions: u64,
    pub positives: u64,
    pub negatives: u64,
    pub flagged: u64,
    pub passed: u64,
}

impl AgentAccuracy {
    pub fn from_counts(counts: ConfusionCounts) -> Self {
        Self {
            counts,
            accuracy_pct: counts.accuracy_pct(),
            decisions: counts.total(),
            positives: counts.positives(),
            negatives: counts.negatives(),
            flagged: counts.flagged(),
            passed: counts.passed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub fast: AgentAccuracy,
    pub slow: AgentAccuracy,
}

impl AccuracySummary {
    pub fn get(&self, role: AgentRole) -> &AgentAccuracy {
        match role {
            AgentRole::Fast => &self.fast,
            AgentRole::Slow => &self.slow,
        }
    }
}
