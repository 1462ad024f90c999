/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Utility functions and numeric constants shared across the crate

pub mod constants;
pub mod matrix;

pub use matrix::Matrix3;

/// Convert an angle from degrees to radians
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees / constants::DEG_PER_RAD
}

/// Convert an angle from radians to degrees
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * constants::DEG_PER_RAD
}
