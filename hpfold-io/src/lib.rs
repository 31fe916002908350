//! Sequence input for the HP lattice folding workspace: streaming FASTA
//! reading and the HP alphabet projection, plus small file-writing helpers.

mod errors;
mod fasta;
mod hp_alphabet;
mod utils;

pub use errors::IoError;
pub use fasta::{FastaIterator, Sequence};
pub use hp_alphabet::{
    classify, classify_with_alphabet, project, project_with_alphabet, HPClass,
    CANONICAL_HYDROPHOBIC,
};
pub use utils::{ensure_parent_dir, out_writer};
