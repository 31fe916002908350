//! The 2D HP lattice chain: data model, contact energy, move library,
//! initialization and the folding Monte Carlo driver.

mod chain;
mod driver;
mod energy;
mod errors;
mod init;
mod mover;
mod moves;
mod observers;
mod position;

pub use chain::{Chain, Delta, HPClass};
pub use driver::{FoldingDriver, StepOutcome};
pub use energy::{ContactEnergy, K_B};
pub use errors::LatticeError;
pub use init::{init_linear, init_random, new_chain, MAX_RANDOM_INIT_ATTEMPTS};
pub use mover::FoldingMover;
pub use moves::{corner_move, crankshaft_move, end_move};
pub use observers::{render_conformation, EnergyTraceObserver, SampleFrameObserver, SharedObserver};
pub use position::Position;
