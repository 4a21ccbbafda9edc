use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened, read or created.
    File { path: PathBuf, message: String },
    /// A required input column is absent from the header row.
    MissingColumn(String),
    /// The CSV stream itself is unreadable (header row, writer failure).
    Csv(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::File { path, message } => write!(f, "{}: {}", path.display(), message),
            IoError::MissingColumn(name) => write!(f, "missing required column '{name}'"),
            IoError::Csv(msg) => write!(f, "csv error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}

impl IoError {
    pub(crate) fn file(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        IoError::File {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv(e.to_string())
    }
}
