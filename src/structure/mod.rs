/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Periodic structures, neighbour tables and structure alignment

pub mod align;
pub mod errors;
pub mod neighbour;
#[allow(clippy::module_inception)]
pub mod structure;

pub use align::{AlignConfig, Alignment, StructureAligner};
pub use errors::{Result, StructureError};
pub use neighbour::{Neighbour, NeighbourConfig, NeighbourTable};
pub use structure::{CoordKind, Structure};
