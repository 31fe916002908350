use displaydoc::Display;
use thiserror::Error;

/// Errors raised while reading sequence input.
#[derive(Error, Display, Debug)]
pub enum IoError {
    /// can't open file {fname}: {io_error}
    CantOpenFile { fname: String, io_error: std::io::Error },
    /// {fname} contains no FASTA records
    EmptyFasta { fname: String },
}
