//! Error handling for the policy rewriter

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the policy rewriter
///
/// Only file access can fail; a `CREATE POLICY` line the scanner cannot
/// fully resolve is passed through unchanged and is not an error.
#[derive(Error, Debug)]
pub enum Error {
    /// The source migration does not exist or could not be read
    #[error("Source error: failed to read {}: {}", path.display(), source)]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rewritten migration could not be written
    #[error("Destination error: failed to write {}: {}", path.display(), source)]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
