use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hpfold_montecarlo::{AcceptanceCriterion, Mover};
use hpfold_sim::{Energy, ObserversSet};
use log::{info, warn};

use crate::chain::Chain;
use crate::energy::ContactEnergy;
use crate::errors::LatticeError;
use crate::mover::FoldingMover;

/// What happened on one Monte Carlo step, passed to the observer set only
/// when the step was accepted.
#[derive(Clone, Copy, Debug)]
pub struct StepOutcome {
    pub step: usize,
    pub energy: f64,
}

/// Drives exactly `iterations` residue-pick-and-move-attempts against a
/// [`Chain`], each either accepted-and-committed or rejected-and-reverted.
pub struct FoldingDriver {
    mover: FoldingMover,
    acceptance: Box<dyn AcceptanceCriterion>,
    energy: ContactEnergy,
}

impl FoldingDriver {
    pub fn new(mover: FoldingMover, acceptance: Box<dyn AcceptanceCriterion>) -> Self {
        FoldingDriver { mover, acceptance, energy: ContactEnergy }
    }

    /// Runs `iterations` steps against `chain`, feeding every accepted
    /// step's energy to `observers`. Checks `cancel` between steps and
    /// returns early (with whatever has run so far) if it becomes `true`.
    ///
    /// Returns an error if the move library ever produces a delta the
    /// chain's own invariants reject - an internal bug, not a normal
    /// rejected proposal.
    pub fn run(
        &mut self,
        chain: &mut Chain,
        iterations: usize,
        observers: &mut ObserversSet<Chain>,
        cancel: &Arc<AtomicBool>,
    ) -> Result<Vec<StepOutcome>, LatticeError> {
        let mut trace = Vec::new();
        for step in 0..iterations {
            if cancel.load(Ordering::Relaxed) {
                warn!("folding run cancelled after {step} of {iterations} steps");
                break;
            }
            let accepted = self.mover.perturb(chain, &self.energy, self.acceptance.as_mut());
            if let Some(err) = self.mover.take_error() {
                return Err(err);
            }
            if accepted.is_some() {
                let energy = self.energy.energy(chain);
                observers.tick(chain);
                trace.push(StepOutcome { step, energy });
            }
        }
        observers.finalize();
        info!(
            "folding run finished: {} of {} steps accepted",
            self.mover.acceptance_statistics().n_succ,
            iterations
        );
        Ok(trace)
    }
}
