use std::fmt;
use std::path::PathBuf;

/// A convenient result type wrapping [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct OpenError {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct ReadRangeError {
    pub row_start: u32,
    pub col_start: u32,
    pub row_end: u32,
    pub col_end: u32,
}

#[derive(Debug)]
pub struct SizeMismatchError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug)]
pub struct RefinementReadError {
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not open dataset at {}! Reason: {}",
            self.path.display(),
            self.reason
        )
    }
}

impl fmt::Display for ReadRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Elevation block rows [{}, {}] cols [{}, {}] is outside the grid!",
            self.row_start, self.row_end, self.col_start, self.col_end
        )
    }
}

impl fmt::Display for SizeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record size mismatch! Expected {} bytes, got {}",
            self.expected, self.actual
        )
    }
}

impl fmt::Display for RefinementReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not read refinement records [{}, {}]!",
            self.start, self.end
        )
    }
}

impl std::error::Error for OpenError {}

impl std::error::Error for ReadRangeError {}

impl std::error::Error for SizeMismatchError {}

impl std::error::Error for RefinementReadError {}

#[derive(Debug)]
pub enum Error {
    OpenError(OpenError),
    ReadRangeError(ReadRangeError),
    SizeMismatchError(SizeMismatchError),
    RefinementReadError(RefinementReadError),
    ConfigError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OpenError(err) => err.fmt(f),
            Error::ReadRangeError(err) => err.fmt(f),
            Error::SizeMismatchError(err) => err.fmt(f),
            Error::RefinementReadError(err) => err.fmt(f),
            Error::ConfigError(msg) => write!(f, "Failed to load configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenError(err) => Some(err),
            Error::ReadRangeError(err) => Some(err),
            Error::SizeMismatchError(err) => Some(err),
            Error::RefinementReadError(err) => Some(err),
            Error::ConfigError(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::ConfigError(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::ConfigError(value.to_string())
    }
}
