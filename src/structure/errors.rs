/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Error types for the structure module

use crate::atoms::AtomError;
use thiserror::Error;

/// Errors raised by structure-level operations
#[derive(Error, Debug)]
pub enum StructureError {
    /// Two atoms closer than the allowed minimum distance
    #[error("Structure overlap: atoms {first} and {second} are {distance:.4} Å apart (cutoff {cutoff} Å)")]
    Overlap {
        first: usize,
        second: usize,
        distance: f64,
        cutoff: f64,
    },

    /// No one-to-one atom correspondence exists between two structures
    #[error("Composition mismatch: {0}")]
    CompositionMismatch(String),

    /// Operation needs index-aligned structures of equal size
    #[error("Atom count mismatch: {left} vs {right}")]
    AtomCountMismatch { left: usize, right: usize },

    /// Operation needs both structures in the same cell
    #[error("Lattice mismatch between structures")]
    LatticeMismatch,

    /// Wrong number of coordinates supplied for a structure
    #[error("Expected {expected} coordinates, got {found}")]
    CoordinateCountMismatch { expected: usize, found: usize },

    /// The two structures coincide, so no displacement direction exists
    #[error("Structures are identical; displacement is zero")]
    ZeroDisplacement,

    /// A neighbour table lacks pairs the caller needs
    #[error("Incomplete neighbour table: {0}")]
    IncompleteNeighbourTable(String),

    #[error(transparent)]
    Atom(#[from] AtomError),
}

/// Result type for structure operations
pub type Result<T> = std::result::Result<T, StructureError>;
