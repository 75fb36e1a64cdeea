use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read corpus at {path:?}")]
    CorpusRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Missing precursor: {precursor}")]
    PrecursorMissing { precursor: String },
    #[error("No records were counted for the timeline")]
    EmptyTimeline,
    #[error("Cannot write output to {path:?}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid ranked list {path:?}: {message}")]
    InvalidRankedList { path: PathBuf, message: String },
    #[error("Cannot read configuration")]
    ConfigRead(#[source] std::io::Error),
    #[error("Cannot parse configuration")]
    ConfigParse(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn precursor_file(path: &Path) -> Error {
        Error::PrecursorMissing {
            precursor: path.display().to_string(),
        }
    }

    pub(crate) fn output<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::OutputWrite { path, source }
    }

    pub(crate) fn corpus<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::CorpusRead { path, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
