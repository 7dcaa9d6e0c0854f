use std::io;
use std::path::PathBuf;

use capstat_core::errors::ParseError;
use thiserror::Error;

/// Error type for capstat-io operations.
#[derive(Error, Debug)]
pub enum CapstatIoError {
    /// A required input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Reports are never overwritten.
    #[error("Output file already exists, refusing to overwrite: {}", .0.display())]
    OutputExists(PathBuf),

    /// Outputs are only written into directories that already exist.
    #[error("Output directory does not exist: {}", .0.display())]
    OutputDirNotFound(PathBuf),

    /// An inputs list names a target that is not in the targets file.
    #[error("{}:{}: unknown target `{}`", .path.display(), .line, .target)]
    UnknownTarget {
        path: PathBuf,
        line: usize,
        target: String,
    },

    #[error("{}:{}: malformed inputs line, {}", .path.display(), .line, .reason)]
    MalformedInputsLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A record line of a track, targets file or report could not be parsed.
    #[error("{}:{}: {}", .path.display(), .line, .source)]
    Track {
        path: PathBuf,
        line: usize,
        source: ParseError,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type alias for capstat-io operations.
pub type Result<T> = std::result::Result<T, CapstatIoError>;

/// Turn a failed open into [`CapstatIoError::FileNotFound`] when the file is simply missing.
pub(crate) fn open_error(path: &std::path::Path, err: io::Error) -> CapstatIoError {
    if err.kind() == io::ErrorKind::NotFound {
        CapstatIoError::FileNotFound(path.to_path_buf())
    } else {
        CapstatIoError::Io(err)
    }
}
