use std::collections::HashMap;

use hpfold_sim::System;

use crate::errors::LatticeError;
use crate::position::Position;

/// A residue's class under the HP projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HPClass {
    H,
    P,
}

/// A proposed set of residue relocations: `(residue index, new position)`.
/// Residue indices are 0-based.
pub type Delta = Vec<(usize, Position)>;

/// A folded chain on the 2D square lattice: one [`HPClass`] and one
/// [`Position`] per residue, plus an occupancy index for O(1) collision
/// checks.
#[derive(Clone, Debug)]
pub struct Chain {
    classes: Vec<HPClass>,
    positions: Vec<Position>,
    occupancy: HashMap<Position, usize>,
}

impl Chain {
    /// Builds a chain from a parsed `classes`/`positions` pair that already
    /// satisfies connectivity and self-avoidance. Used by the
    /// initialization routines; prefer [`crate::init::init_linear`] or
    /// [`crate::init::init_random`] to construct a [`Chain`] from a
    /// `H`/`P` sequence string.
    pub(crate) fn from_parts(classes: Vec<HPClass>, positions: Vec<Position>) -> Self {
        let occupancy = positions.iter().enumerate().map(|(i, p)| (*p, i)).collect();
        Chain { classes, positions, occupancy }
    }

    /// Parses a projected `H`/`P` string into the per-residue class vector.
    /// Any byte other than `H` or `P` is an error at the caller layer; this
    /// workspace always feeds it a string produced by `hpfold-io`'s
    /// projection, so unrecognized characters are treated as `P` here and
    /// the mismatch would show up as an unexpectedly polar chain rather
    /// than a silently wrong fold.
    pub(crate) fn parse_classes(hp_sequence: &str) -> Vec<HPClass> {
        hp_sequence
            .chars()
            .map(|c| if c == 'H' { HPClass::H } else { HPClass::P })
            .collect()
    }

    pub fn length(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, residue: usize) -> Position {
        self.positions[residue]
    }

    pub fn class_at(&self, residue: usize) -> HPClass {
        self.classes[residue]
    }

    /// The residue index occupying `pos`, if any.
    pub fn occupant(&self, pos: Position) -> Option<usize> {
        self.occupancy.get(&pos).copied()
    }

    /// A snapshot of all residue positions, for revert-on-reject.
    pub fn snapshot_positions(&self) -> Vec<Position> {
        self.positions.clone()
    }

    pub fn restore_positions(&mut self, snapshot: &[Position]) {
        self.positions.clear();
        self.positions.extend_from_slice(snapshot);
        self.occupancy.clear();
        self.occupancy.extend(self.positions.iter().enumerate().map(|(i, p)| (*p, i)));
    }

    /// Validates and applies `delta` atomically: either every entry is
    /// committed, or (on a connectivity or self-avoidance violation) the
    /// chain is left completely unchanged and an error is returned.
    pub fn apply(&mut self, delta: &Delta) -> Result<(), LatticeError> {
        self.apply_named(delta, "unspecified")
    }

    /// Same as [`Chain::apply`], but on rejection the returned
    /// [`LatticeError::IllegalMove`] also carries `kind` (the move that
    /// produced `delta`) and a snapshot of the chain as it stood before the
    /// attempt, so a caller surfacing a fatal invariant violation has
    /// something more than a bare residue index to log.
    pub fn apply_named(&mut self, delta: &Delta, kind: &str) -> Result<(), LatticeError> {
        if delta.is_empty() {
            return Ok(());
        }

        let mut trial = self.positions.clone();
        for &(residue, new_pos) in delta {
            trial[residue] = new_pos;
        }

        let illegal = |residue: usize, positions: &[Position]| LatticeError::IllegalMove {
            residue,
            kind: kind.to_string(),
            snapshot: positions.to_vec(),
        };

        // self-avoidance: no two residues may share a lattice point
        let mut seen: HashMap<Position, usize> = HashMap::with_capacity(trial.len());
        for (i, p) in trial.iter().enumerate() {
            if seen.insert(*p, i).is_some() {
                return Err(illegal(delta[0].0, &self.positions));
            }
        }

        // connectivity: every consecutive pair stays at unit distance
        for i in 0..trial.len().saturating_sub(1) {
            if trial[i].manhattan_distance(&trial[i + 1]) != 1 {
                return Err(illegal(delta[0].0, &self.positions));
            }
        }

        self.positions = trial;
        self.occupancy.clear();
        self.occupancy.extend(self.positions.iter().enumerate().map(|(i, p)| (*p, i)));
        Ok(())
    }
}

impl System for Chain {
    fn size(&self) -> usize {
        self.positions.len()
    }

    fn copy_from(&mut self, pos: usize, rhs: &Self) {
        let old = self.positions[pos];
        self.occupancy.remove(&old);
        self.positions[pos] = rhs.positions[pos];
        self.occupancy.insert(self.positions[pos], pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_chain(n: usize) -> Chain {
        let classes = vec![HPClass::H; n];
        let positions: Vec<Position> = (0..n as i32).map(|x| Position::new(x, 0)).collect();
        Chain::from_parts(classes, positions)
    }

    #[test]
    fn occupant_reports_residue_at_position() {
        let chain = straight_chain(4);
        assert_eq!(chain.occupant(Position::new(2, 0)), Some(2));
        assert_eq!(chain.occupant(Position::new(2, 1)), None);
    }

    #[test]
    fn apply_rejects_self_collision_and_leaves_chain_unchanged() {
        let mut chain = straight_chain(4);
        let before = chain.snapshot_positions();
        // moving residue 0 onto residue 2's spot collides
        let delta: Delta = vec![(0, Position::new(2, 0))];
        assert!(chain.apply(&delta).is_err());
        assert_eq!(chain.snapshot_positions(), before);
    }

    #[test]
    fn apply_rejects_broken_connectivity() {
        let mut chain = straight_chain(4);
        let before = chain.snapshot_positions();
        // disconnect residue 0 from residue 1 entirely
        let delta: Delta = vec![(0, Position::new(10, 10))];
        assert!(chain.apply(&delta).is_err());
        assert_eq!(chain.snapshot_positions(), before);
    }

    #[test]
    fn apply_commits_legal_delta() {
        let mut chain = straight_chain(4);
        // rotate the end residue around residue 2 to (2, 1), still adjacent to (1,0)? no: must stay adjacent to residue 2 at (2,0)
        let delta: Delta = vec![(3, Position::new(2, 1))];
        assert!(chain.apply(&delta).is_ok());
        assert_eq!(chain.position(3), Position::new(2, 1));
        assert_eq!(chain.occupant(Position::new(2, 1)), Some(3));
        assert_eq!(chain.occupant(Position::new(3, 0)), None);
    }
}
