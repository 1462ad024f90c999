/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Error types for path interpolation

use crate::atoms::AtomError;
use crate::structure::StructureError;
use thiserror::Error;

/// Errors raised while building or refining an interpolated path
#[derive(Error, Debug)]
pub enum PathError {
    /// Endpoints differ in cell or species sequence
    #[error("Endpoint structures do not match: {0}")]
    StructureMismatch(String),

    /// A path needs at least its two endpoints
    #[error("Path needs at least 2 structures, got {0}")]
    TooFewStructures(usize),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Atom(#[from] AtomError),
}

/// Result type for path operations
pub type Result<T> = std::result::Result<T, PathError>;
