use std::ops::Range;

use hpfold_sim::Energy;

use crate::chain::{Chain, HPClass};

/// Boltzmann constant in kcal/(mol*K), matching the original folding script.
pub const K_B: f64 = 0.0019872041;

/// HP contact energy: every pair of H residues that are adjacent on the
/// lattice but not adjacent in the chain sequence (a "topological contact")
/// contributes `-1.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactEnergy;

impl ContactEnergy {
    /// Number of H-H topological contacts made by the residue at `residue`,
    /// counted once per contact from this residue's side (so the whole-chain
    /// total double counts and must be halved - see [`Energy::energy`]).
    fn contacts_at(chain: &Chain, residue: usize) -> f64 {
        if chain.class_at(residue) != HPClass::H {
            return 0.0;
        }
        let pos = chain.position(residue);
        let mut total = 0.0;
        for neighbor_pos in pos.neighbors() {
            if let Some(other) = chain.occupant(neighbor_pos) {
                let seq_distance = if other > residue { other - residue } else { residue - other };
                if seq_distance > 1 && chain.class_at(other) == HPClass::H {
                    total -= 1.0;
                }
            }
        }
        total
    }
}

impl Energy<Chain> for ContactEnergy {
    fn energy(&self, chain: &Chain) -> f64 {
        let raw: f64 = (0..chain.length()).map(|i| Self::contacts_at(chain, i)).sum();
        raw / 2.0
    }

    fn energy_by_pos(&self, chain: &Chain, pos: usize) -> f64 {
        Self::contacts_at(chain, pos)
    }

    fn energy_by_range(&self, chain: &Chain, range: &Range<usize>) -> f64 {
        (range.start..range.end).map(|i| Self::contacts_at(chain, i)).sum()
    }

    fn name(&self) -> String {
        String::from("ContactEnergy")
    }
}
