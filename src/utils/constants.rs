/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Numeric constants and default tolerances

/// Lattices with |det| below this are rejected as degenerate
pub const LATTICE_DET_TOLERANCE: f64 = 1e-8;

/// Multiplier applied to a reference bond length to classify a pair as bonded
pub const BOND_TOLERANCE_FACTOR: f64 = 1.1;

/// Default nearest-neighbour count for neighbour tables
pub const DEFAULT_NEIGHBOUR_NUM: usize = 12;

/// Default minimum allowed interatomic distance (Å) for overlap checks
pub const OVERLAP_CUTOFF: f64 = 0.1;

/// Regulariser added to the diagonal of IDPP weight denominators
pub const IDPP_WEIGHT_EPSILON: f64 = 1e-8;

/// Degrees per radian
pub const DEG_PER_RAD: f64 = 180.0 / std::f64::consts::PI;
