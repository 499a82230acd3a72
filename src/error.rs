use std::{io, path::PathBuf};

use crate::bed::ParseError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Exactly one close-peak strategy must be selected.
    #[error(
        "merge_close_peaks ({merge}) and keep_highest_close_peak ({keep_highest}) \
         are set the same; enable exactly one of them"
    )]
    ConflictingCloseModes { merge: bool, keep_highest: bool },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{}, line {line}: {source}", .path.display())]
    Parse { path: PathBuf, line: usize, source: ParseError },
}
