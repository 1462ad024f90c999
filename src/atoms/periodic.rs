/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Minimum-image arithmetic under periodic boundary conditions
//!
//! Every distance, bond and alignment in the crate goes through
//! [`minimum_image_fractional_diff`]. The convention shifts a fractional
//! difference component by whole cells until it lies in `[-0.5, 0.5]`; an
//! exact ±0.5 is left where it is, which keeps the routine antisymmetric.
//! This is exact for cells that are not strongly skewed.

use super::lattice::Lattice;
use super::vector::Vector3D;

/// Reduce a fractional coordinate into `[0, 1)` (component-wise modulo 1)
pub fn wrap_fractional(frac: &Vector3D) -> Vector3D {
    frac.map(|v| {
        let wrapped = v.rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs
        if wrapped >= 1.0 {
            0.0
        } else {
            wrapped
        }
    })
}

/// Whole-cell shift that brings a single difference component into [-0.5, 0.5]
fn image_shift(d: f64) -> f64 {
    let excess = (d.abs() - 0.5).max(0.0).ceil();
    -excess * d.signum()
}

/// Integer translation that, added to `frac_j`, gives the periodic image of
/// atom j closest to `frac_i`
///
/// For wrapped coordinates every component is in {-1, 0, 1}.
pub fn search_image(frac_i: &Vector3D, frac_j: &Vector3D) -> [i32; 3] {
    let d = *frac_j - *frac_i;
    [image_shift(d.x) as i32, image_shift(d.y) as i32, image_shift(d.z) as i32]
}

/// Minimum-image fractional difference `b - a`, each component in [-0.5, 0.5]
pub fn minimum_image_fractional_diff(frac_a: &Vector3D, frac_b: &Vector3D) -> Vector3D {
    (*frac_b - *frac_a).map(|d| d + image_shift(d))
}

/// Minimum-image Cartesian displacement from `a` to the nearest image of `b`
pub fn minimum_image_cartesian_diff(
    lattice: &Lattice,
    frac_a: &Vector3D,
    frac_b: &Vector3D,
) -> Vector3D {
    lattice.frac_to_cart(&minimum_image_fractional_diff(frac_a, frac_b))
}

/// Minimum-image Cartesian distance between two fractional coordinates
pub fn minimum_image_distance(lattice: &Lattice, frac_a: &Vector3D, frac_b: &Vector3D) -> f64 {
    minimum_image_cartesian_diff(lattice, frac_a, frac_b).length()
}

/// Convert an integer image vector into its Cartesian translation
pub fn image_translation(lattice: &Lattice, image: [i32; 3]) -> Vector3D {
    lattice.frac_to_cart(&Vector3D::new(
        f64::from(image[0]),
        f64::from(image[1]),
        f64::from(image[2]),
    ))
}
