//! Error types.
//!
//! Numeric singularities are not errors: they travel as infinite or NaN
//! values. The variants here cover broken invariants (a worker that could
//! not be joined), configuration the products cannot converge for, and
//! malformed triangulation files.

use std::io;

use thiserror::Error;

/// Failure of a tabulation task.
#[derive(Error, Debug)]
pub enum TabulationError {
    #[error("failed to spawn tabulation task for quad #{quad}: {source}")]
    Spawn {
        quad: usize,
        #[source]
        source: io::Error,
    },

    #[error("tabulation task for quad #{quad} terminated abnormally")]
    WorkerPanicked { quad: usize },
}

/// Failure of an integral computation.
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("|q| = {modulus} does not satisfy 0 < |q| < 1")]
    NomeOutOfRange { modulus: f64 },

    #[error(transparent)]
    Tabulation(#[from] TabulationError),

    #[error("integrand provider is not ready after tabulation")]
    ProviderNotReady,

    #[error("failed to spawn integration worker #{worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },

    #[error("integration worker #{worker} could not be joined; its partial sum is lost")]
    WorkerPanicked { worker: usize },
}

/// Failure to load or validate a triangulation.
#[derive(Error, Debug)]
pub enum ManifoldError {
    #[error("cannot read triangulation file: {0}")]
    Io(#[from] io::Error),

    #[error("triangulation file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("\"N\" is {0}, which is not a valid number of tetrahedra")]
    InvalidTetrahedra(i64),

    #[error("the manifold must have at least one boundary component")]
    NoCusp,

    #[error("{0} boundary components found; only one cusp is supported")]
    MultipleCusps(usize),

    #[error("row {row} of \"L\" has {found} entries, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("\"a\" has {found} entries, expected {expected}")]
    AngleLength { expected: usize, found: usize },
}

pub type Result<T, E = IntegrationError> = std::result::Result<T, E>;
