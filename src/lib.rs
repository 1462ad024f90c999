/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! # gvasp-rs
//!
//! Periodic structure toolkit for post-processing VASP calculations.
//!
//! The crate models a crystal as a [`Lattice`](atoms::Lattice) plus an ordered
//! [`AtomSet`](atoms::AtomSet) and builds everything on minimum-image
//! geometry:
//!
//! - [`structure::NeighbourTable`]: per-atom neighbours with bonded /
//!   non-bonded classification from species-pair reference bond lengths
//! - [`structure::StructureAligner`]: reorders two structures of the same
//!   composition into atom-by-atom correspondence
//! - [`path::LinearPath`] and [`path::IdppPath`]: initial-guess reaction
//!   paths for nudged-elastic-band calculations
//!
//! File formats (POSCAR, CASTEP `.cell`, MODECAR, NEB image directories) live
//! in [`io`]; tunables in [`config`].

pub mod atoms;
pub mod cli;
pub mod config;
pub mod io;
pub mod path;
pub mod structure;
pub mod utils;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

pub use atoms::{Atom, AtomSet, Lattice, Position, Vector3D};
pub use path::{IdppConfig, IdppPath, LinearPath};
pub use structure::{AlignConfig, NeighbourConfig, NeighbourTable, Structure, StructureAligner};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
