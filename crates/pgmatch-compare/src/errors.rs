use thiserror::Error;

/// Errors that abort a comparison run.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("{phase} failed: {source}")]
    Phase {
        phase: &'static str,
        source: pgmatch_core::Error,
    },
    #[error("incompatible catalogs: {0}")]
    Incompatible(String),
    #[error("{0}")]
    MissingSchema(String),
}

impl CompareError {
    pub(crate) fn phase(phase: &'static str) -> impl FnOnce(pgmatch_core::Error) -> Self {
        move |source| CompareError::Phase { phase, source }
    }
}
