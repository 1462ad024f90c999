/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Error types for the atoms module

/// Error types for the atoms module
#[derive(Debug, thiserror::Error)]
pub enum AtomError {
    #[error("Degenerate lattice: determinant {0:e} is (near) zero")]
    DegenerateLattice(f64),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid atom set: {0}")]
    InvalidAtomSet(String),

    #[error("Species table error: {0}")]
    SpeciesTable(String),

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Result type for atom operations
pub type Result<T> = std::result::Result<T, AtomError>;
