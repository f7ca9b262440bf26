// src/agent.rs
//
// Tabular learner for game-delayed reinforcements.
//
// Each agent keeps a Q-table and a visit-count table keyed by
// (observation, action). Rewards arrive later than the action that earned
// them, routed back by the coordinator; the update is a running average with
// step size 1 / (1 + visits), so early rewards move the estimate quickly and
// later ones converge it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Action, IndexError, Observation};

/// Optimistic initial action value; biases early behaviour toward acting.
pub const INITIAL_Q: f64 = 1.0;

/// Delayed-reward tabular agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayedRewardAgent {
    n_observation: usize,
    max_filler: Option<usize>,
    q_table: Vec<[f64; 2]>,
    visits: Vec<[u64; 2]>,
}

impl DelayedRewardAgent {
    /// `max_filler` is accepted for configuration parity but is not used by
    /// `act` or `update_reward`.
    pub fn new(n_observation: usize, max_filler: Option<usize>) -> Self {
        Self {
            n_observation,
            max_filler,
            q_table: vec![[INITIAL_Q; Action::COUNT]; n_observation],
            visits: vec![[0; Action::COUNT]; n_observation],
        }
    }

    pub fn n_observation(&self) -> usize {
        self.n_observation
    }

    pub fn max_filler(&self) -> Option<usize> {
        self.max_filler
    }

    fn row(&self, observation: Observation) -> Result<usize, IndexError> {
        if observation < self.n_observation {
            Ok(observation)
        } else {
            Err(IndexError::Observation {
                index: observation,
                len: self.n_observation,
            })
        }
    }

    /// Greedy action for `observation`; exact ties are broken uniformly at
    /// random.
    pub fn act<R: Rng + ?Sized>(
        &self,
        observation: Observation,
        rng: &mut R,
    ) -> Result<Action, IndexError> {
        let row = self.row(observation)?;
        match self.greedy(row) {
            Some(action) => Ok(action),
            None => Ok(Action::ALL[rng.gen_range(0..Action::COUNT)]),
        }
    }

    /// Greedy action for a row, `None` when both actions tie exactly.
    fn greedy(&self, row: usize) -> Option<Action> {
        let [q_none, q_act] = self.q_table[row];
        if q_act > q_none {
            Some(Action::Act)
        } else if q_none > q_act {
            Some(Action::NoAction)
        } else {
            None
        }
    }

    /// Apply a delayed reward to `(observation, action)`.
    ///
    /// `q <- (1 - a) * q + a * reward` with `a = 1 / (1 + visits)`, then the
    /// visit count is incremented. Rewards are not clipped.
    pub fn update_reward(
        &mut self,
        observation: Observation,
        action: Action,
        reward: f64,
    ) -> Result<(), IndexError> {
        let row = self.row(observation)?;
        let col = action.index();
        let rate = step_size(self.visits[row][col]);
        let old = self.q_table[row][col];
        self.q_table[row][col] = (1.0 - rate) * old + rate * reward;
        self.visits[row][col] += 1;
        Ok(())
    }

    /// Raw-index variant of `update_reward` for callers holding integer
    /// actions.
    pub fn update_reward_index(
        &mut self,
        observation: Observation,
        action: usize,
        reward: f64,
    ) -> Result<(), IndexError> {
        let action = Action::from_index(action)?;
        self.update_reward(observation, action, reward)
    }

    pub fn q_value(&self, observation: Observation, action: Action) -> Result<f64, IndexError> {
        Ok(self.q_table[self.row(observation)?][action.index()])
    }

    pub fn visits(&self, observation: Observation, action: Action) -> Result<u64, IndexError> {
        Ok(self.visits[self.row(observation)?][action.index()])
    }

    /// Step size the next update of `(observation, action)` will use.
    pub fn next_step_size(
        &self,
        observation: Observation,
        action: Action,
    ) -> Result<f64, IndexError> {
        Ok(step_size(self.visits(observation, action)?))
    }

    pub fn total_updates(&self) -> u64 {
        self.visits.iter().flat_map(|r| r.iter()).sum()
    }

    /// Greedy action per observation bucket (`None` = tie).
    pub fn greedy_policy(&self) -> Vec<Option<Action>> {
        (0..self.n_observation).map(|row| self.greedy(row)).collect()
    }

    pub fn q_table(&self) -> &[[f64; Action::COUNT]] {
        &self.q_table
    }
}

/// Learning rate after `visits` prior updates.
pub fn step_size(visits: u64) -> f64 {
    1.0 / (1.0 + visits as f64)
}
