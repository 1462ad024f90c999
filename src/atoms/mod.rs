/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Atomic data, lattices and periodic geometry
//!
//! This module provides the leaf types of the crate: the [`Lattice`], the
//! [`Atom`] and [`AtomSet`] types, minimum-image arithmetic in [`periodic`],
//! the element [`database`] and the process-wide [`species`] table used for
//! bond classification.

pub mod atom;
pub mod atom_set;
pub mod database;
pub mod errors;
pub mod lattice;
pub mod periodic;
pub mod species;
pub mod vector;

pub use atom::{Atom, Position};
pub use atom_set::AtomSet;
pub use errors::{AtomError, Result};
pub use lattice::Lattice;
pub use periodic::{
    minimum_image_cartesian_diff, minimum_image_distance, minimum_image_fractional_diff,
    search_image, wrap_fractional,
};
pub use species::{species_table, SpeciesProperties, SpeciesTable};
pub use vector::Vector3D;
