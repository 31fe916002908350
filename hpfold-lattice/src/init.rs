use log::warn;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::chain::{Chain, HPClass};
use crate::errors::LatticeError;
use crate::position::Position;

/// Upper bound on self-avoiding-walk restart attempts for [`init_random`].
pub const MAX_RANDOM_INIT_ATTEMPTS: usize = 10_000;

/// Places residues on a straight line along the x axis: `(0,0), (1,0), ...`.
/// Always succeeds; a straight line is trivially self-avoiding and
/// connected for any chain length.
pub fn init_linear(classes: Vec<HPClass>) -> Chain {
    let positions: Vec<Position> = (0..classes.len() as i32).map(|x| Position::new(x, 0)).collect();
    Chain::from_parts(classes, positions)
}

/// Grows a self-avoiding walk one residue at a time, picking a uniformly
/// random unoccupied lattice neighbor at each step. Restarts from scratch
/// whenever the walk paints itself into a corner, up to
/// [`MAX_RANDOM_INIT_ATTEMPTS`] times in total.
pub fn init_random(classes: Vec<HPClass>, rng: &mut impl Rng) -> Result<Chain, LatticeError> {
    let n = classes.len();
    if n == 0 {
        return Err(LatticeError::EmptySequence);
    }

    for attempt in 1..=MAX_RANDOM_INIT_ATTEMPTS {
        if let Some(positions) = try_one_walk(n, rng) {
            return Ok(Chain::from_parts(classes, positions));
        }
        if attempt == MAX_RANDOM_INIT_ATTEMPTS {
            return Err(LatticeError::InitializationFailed { attempts: attempt });
        }
    }
    unreachable!("loop always returns on its last iteration")
}

fn try_one_walk(n: usize, rng: &mut impl Rng) -> Option<Vec<Position>> {
    use std::collections::HashSet;

    let mut occupied: HashSet<Position> = HashSet::with_capacity(n);
    let mut positions: Vec<Position> = Vec::with_capacity(n);

    let start = Position::new(0, 0);
    positions.push(start);
    occupied.insert(start);

    while positions.len() < n {
        let last = *positions.last().unwrap();
        let mut candidates: Vec<Position> =
            last.neighbors().into_iter().filter(|p| !occupied.contains(p)).collect();
        if candidates.is_empty() {
            return None;
        }
        let choice = candidates.swap_remove(rng.gen_range(0..candidates.len()));
        occupied.insert(choice);
        positions.push(choice);
    }
    Some(positions)
}

/// Builds a [`Chain`] for `hp_sequence` (already projected to `H`/`P`)
/// using `mode` (`"linear"` or `"random"`). An unrecognized mode falls
/// back to `"linear"` with a warning rather than failing the run.
pub fn new_chain(hp_sequence: &str, mode: &str) -> Result<Chain, LatticeError> {
    if hp_sequence.is_empty() {
        return Err(LatticeError::EmptySequence);
    }
    let classes = Chain::parse_classes(hp_sequence);
    match mode {
        "random" => {
            let mut rng = SmallRng::from_entropy();
            init_random(classes, &mut rng)
        }
        "linear" => Ok(init_linear(classes)),
        other => {
            warn!("unrecognized init method {other:?}, falling back to linear");
            Ok(init_linear(classes))
        }
    }
}
