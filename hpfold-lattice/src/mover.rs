use std::ops::Range;

use hpfold_montecarlo::{AcceptanceCriterion, AcceptanceStatistics, Mover};
use hpfold_sim::Energy;
use log::error;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::chain::{Chain, Delta};
use crate::energy::ContactEnergy;
use crate::errors::LatticeError;
use crate::moves::{corner_move, crankshaft_move, end_move};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MoveKind {
    End,
    Corner,
    Crankshaft,
}

impl MoveKind {
    fn as_str(&self) -> &'static str {
        match self {
            MoveKind::End => "end",
            MoveKind::Corner => "corner",
            MoveKind::Crankshaft => "crankshaft",
        }
    }
}

/// Picks a residue, picks one of its admissible move kinds, and attempts a
/// single Metropolis step: propose, evaluate, accept-and-commit or
/// revert. Implements [`hpfold_montecarlo::Mover`] so it can be driven by
/// the generic Metropolis vocabulary, but is also used directly by
/// [`crate::driver::FoldingDriver`] which needs the per-step outcome.
pub struct FoldingMover {
    rng: SmallRng,
    stats: AcceptanceStatistics,
    error: Option<LatticeError>,
}

impl FoldingMover {
    pub fn new() -> Self {
        FoldingMover { rng: SmallRng::from_entropy(), stats: Default::default(), error: None }
    }

    pub fn from_seed(seed: u64) -> Self {
        FoldingMover { rng: SmallRng::seed_from_u64(seed), stats: Default::default(), error: None }
    }

    /// A fatal, invariant-violating error raised by the most recent
    /// [`Mover::perturb`] call, if any. A move-library probe should never
    /// produce a delta that `Chain::apply` then refuses; if it does, this
    /// is surfaced here rather than panicking, so the driver can log it
    /// and stop the run cleanly.
    pub fn take_error(&mut self) -> Option<LatticeError> {
        self.error.take()
    }

    /// Probes every move kind that is structurally applicable to `residue`
    /// (position in the chain alone, not geometry) and returns the
    /// `(kind, delta)` pairs among those that actually produced a delta.
    /// A move kind can be structurally eligible yet geometrically
    /// inadmissible (e.g. a corner move whose flanking residues aren't
    /// diagonal); probing every eligible kind up front, rather than
    /// committing to one before evaluating it, keeps the draw over move
    /// *kinds* uniform over the ones that actually succeeded.
    fn candidate_moves(&mut self, chain: &Chain, residue: usize) -> Vec<(MoveKind, Delta)> {
        let last = chain.length() - 1;
        if residue == 0 || residue == last {
            return end_move(chain, residue, &mut self.rng)
                .map(|d| vec![(MoveKind::End, d)])
                .unwrap_or_default();
        }
        let mut candidates = Vec::new();
        if let Some(d) = corner_move(chain, residue) {
            candidates.push((MoveKind::Corner, d));
        }
        if residue + 2 <= last {
            if let Some(d) = crankshaft_move(chain, residue) {
                candidates.push((MoveKind::Crankshaft, d));
            }
        }
        candidates
    }
}

impl Default for FoldingMover {
    fn default() -> Self {
        Self::new()
    }
}

impl Mover<Chain, ContactEnergy> for FoldingMover {
    fn perturb(
        &mut self,
        system: &mut Chain,
        energy: &ContactEnergy,
        acceptance: &mut dyn AcceptanceCriterion,
    ) -> Option<Range<usize>> {
        let n = system.length();
        if n == 0 {
            return None;
        }
        let residue = self.rng.gen_range(0..n);
        let mut candidates = self.candidate_moves(system, residue);
        if candidates.is_empty() {
            self.stats.n_failed += 1;
            return None;
        }
        let (kind, delta) = candidates.swap_remove(self.rng.gen_range(0..candidates.len()));

        let energy_before = energy.energy(system);
        let snapshot = system.snapshot_positions();
        let touched: Range<usize> = {
            let lo = delta.iter().map(|(i, _)| *i).min().unwrap();
            let hi = delta.iter().map(|(i, _)| *i).max().unwrap();
            lo..(hi + 1)
        };

        if let Err(err) = system.apply_named(&delta, kind.as_str()) {
            error!(
                "mover produced an inadmissible {} delta for residue {residue}: {err}",
                kind.as_str()
            );
            self.error = Some(err);
            self.stats.n_failed += 1;
            return None;
        }

        let energy_after = energy.energy(system);
        if acceptance.check(energy_before, energy_after) {
            self.stats.n_succ += 1;
            Some(touched)
        } else {
            system.restore_positions(&snapshot);
            self.stats.n_failed += 1;
            None
        }
    }

    fn acceptance_statistics(&self) -> AcceptanceStatistics {
        self.stats.clone()
    }

    fn max_range(&self) -> f64 {
        1.0
    }

    fn set_max_range(&mut self, _new_val: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::HPClass;
    use crate::init::init_linear;
    use crate::position::Position;
    use hpfold_montecarlo::GreedyCriterion;

    #[test]
    fn perturb_either_moves_or_leaves_chain_legal() {
        let mut chain = init_linear(vec![HPClass::H; 6]);
        let mut mover = FoldingMover::from_seed(123);
        let mut acc = GreedyCriterion;
        let energy = ContactEnergy;
        for _ in 0..50 {
            mover.perturb(&mut chain, &energy, &mut acc);
            assert!(mover.take_error().is_none());
            for i in 0..chain.length() - 1 {
                assert_eq!(chain.position(i).manhattan_distance(&chain.position(i + 1)), 1);
            }
        }
    }

    #[test]
    fn candidate_moves_probes_every_structurally_eligible_kind() {
        // straight chain: residue 1's neighbors are colinear, so corner is
        // geometrically inadmissible and crankshaft needs a closed square
        // that isn't there either - both structurally eligible, neither
        // should appear among the candidates.
        let chain = init_linear(vec![HPClass::H; 5]);
        let mut mover = FoldingMover::from_seed(1);
        assert!(mover.candidate_moves(&chain, 1).is_empty());
    }

    #[test]
    fn candidate_moves_excludes_a_structurally_eligible_but_geometrically_inadmissible_kind() {
        // Z-shaped chain: residue 1 is structurally eligible for both corner
        // and crankshaft (0 < 1, 1+2 <= last), but the flanking residues of
        // the crankshaft window (0 and 3) are 3 apart, not a closed unit
        // square - only corner should come back as a candidate.
        let mut chain = init_linear(vec![HPClass::H; 5]);
        chain
            .apply(&vec![
                (1, Position::new(1, 0)),
                (2, Position::new(1, 1)),
                (3, Position::new(2, 1)),
                (4, Position::new(2, 0)),
            ])
            .unwrap();
        let mut mover = FoldingMover::from_seed(1);
        let kinds: Vec<MoveKind> = mover.candidate_moves(&chain, 1).into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![MoveKind::Corner]);
    }

    #[test]
    fn greedy_criterion_never_raises_energy() {
        let mut chain = init_linear(vec![HPClass::H, HPClass::P, HPClass::H, HPClass::P, HPClass::H, HPClass::H]);
        let mut mover = FoldingMover::from_seed(7);
        let mut acc = GreedyCriterion;
        let energy = ContactEnergy;
        let mut last = energy.energy(&chain);
        for _ in 0..100 {
            mover.perturb(&mut chain, &energy, &mut acc);
            let now = energy.energy(&chain);
            assert!(now <= last);
            last = now;
        }
    }
}
