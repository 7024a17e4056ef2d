//! Solver settings, loadable from a JSON file and overridable per field.
use crate::errors::{Error, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub pop_size: usize,
    pub generations: usize,
    pub survive_rate: f32,
    pub cross_rate: f32,
    pub point_mutate_rate: f32,
    pub limb_mutate_rate: f32,
    pub stop_score: f32,
    pub max_stagnant_gens: usize,
    pub len_dev: usize,
    pub avg_pair_dist: f32,
    pub rand_seed: u32,
    pub n_best_sols: usize,
    /// Worker thread count; 0 uses all available cores.
    pub workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pop_size: 10_000,
            generations: 1_000,
            survive_rate: 0.1,
            cross_rate: 0.5,
            point_mutate_rate: 0.5,
            limb_mutate_rate: 0.5,
            // Small but not exactly zero: scores hit the threshold through
            // imprecise float comparison.
            stop_score: 0.01,
            max_stagnant_gens: 50,
            len_dev: 3,
            // Average CoM distance across the curated module pairs.
            avg_pair_dist: 38.0,
            rand_seed: 0x1337_cafe,
            n_best_sols: 3,
            workers: 0,
        }
    }
}

impl SolverConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Range-check every field and normalize the operator rates when their
    /// sum exceeds one. Called once at startup; failures are fatal.
    pub fn validate(&mut self) -> Result<()> {
        if self.pop_size == 0 {
            return Err(Error::Config("pop_size must be positive".into()));
        }
        if self.generations == 0 {
            return Err(Error::Config("generations must be positive".into()));
        }
        for (name, rate) in [
            ("survive_rate", self.survive_rate),
            ("cross_rate", self.cross_rate),
            ("point_mutate_rate", self.point_mutate_rate),
            ("limb_mutate_rate", self.limb_mutate_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::Config(format!(
                    "{} must be between 0 and 1 inclusive, got {}",
                    name, rate
                )));
            }
        }
        if self.stop_score < 0.0 {
            return Err(Error::Config(format!(
                "stop_score must be non-negative, got {}",
                self.stop_score
            )));
        }
        if self.avg_pair_dist <= 0.0 {
            return Err(Error::Config(format!(
                "avg_pair_dist must be positive, got {}",
                self.avg_pair_dist
            )));
        }
        if self.n_best_sols == 0 || self.n_best_sols > self.pop_size {
            return Err(Error::Config(format!(
                "n_best_sols must be in [1, pop_size], got {}",
                self.n_best_sols
            )));
        }

        let sum = self.cross_rate + self.point_mutate_rate + self.limb_mutate_rate;
        if sum > 1.0 {
            self.cross_rate /= sum;
            self.point_mutate_rate /= sum;
            self.limb_mutate_rate /= sum;
            warn!(
                "cross + point mutate + limb mutate rates exceed 1; \
                 normalized to {:.2}, {:.2}, {:.2}",
                self.cross_rate, self.point_mutate_rate, self.limb_mutate_rate
            );
        }

        let survivors = (self.survive_rate * self.pop_size as f32).round() as usize;
        if survivors == 0 {
            return Err(Error::Config(format!(
                "survive_rate {} rounds to zero survivors for pop_size {}",
                self.survive_rate, self.pop_size
            )));
        }

        Ok(())
    }
}
