//! Output persistence
//!
//! Writes the final byte buffer to the output path. The file handle is
//! scoped to this single operation and released on every exit path.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Write `bytes` to `path`, returning the number of bytes written
///
/// Truncates any existing file at the path. Fails with an IO error if the
/// path is unwritable.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<u64> {
    let mut file = File::create(path).map_err(|source| io_err(path, source))?;
    file.write_all(bytes).map_err(|source| io_err(path, source))?;
    file.flush().map_err(|source| io_err(path, source))?;

    Ok(bytes.len() as u64)
}

fn io_err(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}
