use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::trait_acceptance_criterion::AcceptanceCriterion;

/// Standard Metropolis criterion: accepts downhill moves unconditionally and
/// accepts uphill moves with probability `exp(-delta / temperature)`.
///
/// `temperature` here is already in energy units (i.e. `T * k_b` has been
/// folded in by the caller), matching how [`crate::AcceptanceCriterion::check`]
/// is invoked throughout this workspace.
pub struct MetropolisCriterion {
    pub temperature: f64,
    rng: SmallRng,
}

impl MetropolisCriterion {
    pub fn new(temperature: f64) -> Self {
        MetropolisCriterion { temperature, rng: SmallRng::from_entropy() }
    }

    /// Builds a criterion with a fixed seed, for reproducible runs and tests.
    pub fn from_seed(temperature: f64, seed: u64) -> Self {
        MetropolisCriterion { temperature, rng: SmallRng::seed_from_u64(seed) }
    }
}

impl AcceptanceCriterion for MetropolisCriterion {
    fn check(&mut self, energy_before: f64, energy_after: f64) -> bool {
        let delta = energy_after - energy_before;
        if delta <= 0.0 {
            return true;
        }
        let p = (-delta / self.temperature).exp();
        let accept = self.rng.gen::<f64>() < p;
        log::trace!("uphill move delta={delta:.3} p={p:.3} accept={accept}");
        accept
    }

    fn name(&self) -> String {
        String::from("MetropolisCriterion")
    }
}
