/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Reaction-path interpolation for nudged-elastic-band initial guesses
//!
//! [`LinearPath`] places images on the straight Cartesian line between two
//! aligned endpoints. [`IdppPath`] refines such a guess so that interatomic
//! distances along the path follow the interpolated endpoint distances, which
//! avoids the unphysically short contacts a linear guess often produces.

mod errors;
mod idpp;
mod linear;

pub use errors::{PathError, Result};
pub use idpp::{IdppConfig, IdppPath, IdppResult, IdppStatus};
pub use linear::LinearPath;
