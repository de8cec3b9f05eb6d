use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no training samples")]
    EmptyTrainingSet,
    #[error("{samples} samples but {labels} labels")]
    LengthMismatch { samples: usize, labels: usize },
    #[error("need at least two classes, got {0}")]
    NotEnoughClasses(usize),
    #[error("invalid n-gram range {min}..={max}")]
    InvalidNgramRange { min: usize, max: usize },
    #[error("empty vocabulary; file names contain no n-grams")]
    EmptyVocabulary,
}

/// Why a single file could not be organized.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("label {0:?} is not a usable folder name")]
    InvalidLabel(String),
    #[error("destination already exists: {0:?}")]
    DestinationExists(PathBuf),
    #[error("{op} {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OrganizeError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OrganizeError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not an existing directory: {0:?}")]
    NotADirectory(PathBuf),
    #[error("failed to train or load a model")]
    NoModel,
}
