use std::io::BufRead;

/// A single FASTA record: its header id (without the leading `>`) and the
/// concatenated residue string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub residues: String,
}

/// Streams [`Sequence`] records out of a buffered FASTA source.
///
/// Holds at most one pending header line in memory; residue lines are
/// concatenated into the current record as they are read, so this does not
/// load the whole file at once.
pub struct FastaIterator<R: BufRead> {
    reader: R,
    pending_header: Option<String>,
}

impl<R: BufRead> FastaIterator<R> {
    pub fn new(reader: R) -> Self {
        FastaIterator { reader, pending_header: None }
    }
}

impl<R: BufRead> Iterator for FastaIterator<R> {
    type Item = Sequence;

    fn next(&mut self) -> Option<Sequence> {
        let mut id = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                let mut line = String::new();
                let n = self.reader.read_line(&mut line).ok()?;
                if n == 0 {
                    return None;
                }
                let line = line.trim_end();
                if let Some(rest) = line.strip_prefix('>') {
                    break rest.to_string();
                }
                // lines before the first '>' are not a record; skip them
            },
        };
        id = id.trim().to_string();

        let mut residues = String::new();
        loop {
            let mut line = String::new();
            let n = match self.reader.read_line(&mut line) {
                Ok(n) => n,
                Err(_) => break,
            };
            if n == 0 {
                break;
            }
            let trimmed = line.trim_end();
            if let Some(rest) = trimmed.strip_prefix('>') {
                self.pending_header = Some(rest.to_string());
                break;
            }
            residues.push_str(trimmed.trim());
        }

        Some(Sequence { id, residues })
    }
}
