use rand::Rng;

use crate::chain::{Chain, Delta};
use crate::position::Position;

fn is_free(chain: &Chain, pos: Position, moving: &[usize]) -> bool {
    match chain.occupant(pos) {
        None => true,
        Some(idx) => moving.contains(&idx),
    }
}

/// Proposes relocating a terminal residue (index `0` or `chain.length()-1`)
/// to one of the unoccupied lattice points adjacent to its one bonded
/// neighbor. Returns `None` if `residue` is not a chain end, or if every
/// candidate is occupied. Draws uniformly among the admissible candidates.
pub fn end_move(chain: &Chain, residue: usize, rng: &mut impl Rng) -> Option<Delta> {
    let last = chain.length() - 1;
    if residue != 0 && residue != last {
        return None;
    }
    let anchor_idx = if residue == 0 { 1 } else { last - 1 };
    let anchor = chain.position(anchor_idx);
    let current = chain.position(residue);

    let mut candidates: Vec<Position> = anchor
        .neighbors()
        .into_iter()
        .filter(|&p| p != current && is_free(chain, p, &[residue]))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let choice = candidates.swap_remove(rng.gen_range(0..candidates.len()));
    Some(vec![(residue, choice)])
}

/// Proposes relocating an interior residue `i` (`0 < i < chain.length()-1`)
/// to the opposite corner of the unit square formed with its two bonded
/// neighbors, when those neighbors are diagonally adjacent to each other.
/// Returns `None` if the neighbors are not diagonal, or the opposite corner
/// is occupied.
pub fn corner_move(chain: &Chain, residue: usize) -> Option<Delta> {
    if residue == 0 || residue + 1 >= chain.length() {
        return None;
    }
    let prev = chain.position(residue - 1);
    let next = chain.position(residue + 1);
    let current = chain.position(residue);

    if (prev.x - next.x).abs() != 1 || (prev.y - next.y).abs() != 1 {
        return None;
    }
    let candidate = Position::new(prev.x + next.x - current.x, prev.y + next.y - current.y);
    if candidate == current || !is_free(chain, candidate, &[residue]) {
        return None;
    }
    Some(vec![(residue, candidate)])
}

/// Proposes flipping a 4-residue "U" formed by `residue-1, residue,
/// residue+1, residue+2` to the mirror side of the unit square it closes.
/// `residue` and `residue+1` are the two relocated positions. Returns
/// `None` if `residue-1` and `residue+2` are not adjacent (i.e. the four
/// residues do not close a unit square), or either mirrored position is
/// occupied by a residue not part of this move.
pub fn crankshaft_move(chain: &Chain, residue: usize) -> Option<Delta> {
    if residue == 0 || residue + 2 >= chain.length() {
        return None;
    }
    let a = chain.position(residue - 1);
    let b = chain.position(residue);
    let c = chain.position(residue + 1);
    let d = chain.position(residue + 2);

    if a.manhattan_distance(&d) != 1 {
        return None;
    }
    let new_b = Position::new(a.x + d.x - c.x, a.y + d.y - c.y);
    let new_c = Position::new(a.x + d.x - b.x, a.y + d.y - b.y);
    if new_b == b && new_c == c {
        return None;
    }
    let moving = [residue, residue + 1];
    if !is_free(chain, new_b, &moving) || !is_free(chain, new_c, &moving) {
        return None;
    }
    Some(vec![(residue, new_b), (residue + 1, new_c)])
}
