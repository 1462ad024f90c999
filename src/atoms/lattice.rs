/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Periodic lattice (3x3 cell matrix) and its derived quantities

use super::errors::{AtomError, Result};
use super::vector::Vector3D;
use crate::utils::constants::LATTICE_DET_TOLERANCE;
use crate::utils::matrix::{self, Matrix3};
use crate::utils::{deg_to_rad, rad_to_deg};
use std::fmt;

/// A periodic cell whose rows are the lattice vectors a, b and c
///
/// The matrix is validated once at construction and never changes; the
/// inverse is computed eagerly and cached alongside it.
#[derive(Debug, Clone)]
pub struct Lattice {
    matrix: Matrix3,
    inverse: Matrix3,
}

impl Lattice {
    /// Build a lattice from a row-wise 3x3 matrix
    ///
    /// Fails with [`AtomError::DegenerateLattice`] when the determinant is
    /// (near) zero.
    pub fn new(matrix: Matrix3) -> Result<Self> {
        let det = matrix::determinant(&matrix);
        if !det.is_finite() || det.abs() < LATTICE_DET_TOLERANCE {
            return Err(AtomError::DegenerateLattice(det));
        }
        let inverse = matrix::inverse(&matrix).ok_or(AtomError::DegenerateLattice(det))?;
        Ok(Self { matrix, inverse })
    }

    /// Build a lattice from three lattice vectors
    pub fn from_vectors(a: Vector3D, b: Vector3D, c: Vector3D) -> Result<Self> {
        Self::new([a.to_array(), b.to_array(), c.to_array()])
    }

    /// Cubic cell with edge length `a`
    pub fn cubic(a: f64) -> Result<Self> {
        Self::orthorhombic(a, a, a)
    }

    /// Orthorhombic cell with edge lengths `a`, `b`, `c`
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self> {
        Self::new([[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]])
    }

    /// Build a cell from edge lengths and angles (degrees), with a along x
    /// and b in the xy-plane
    pub fn from_lengths_and_angles(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self> {
        let (cos_alpha, cos_beta) = (deg_to_rad(alpha).cos(), deg_to_rad(beta).cos());
        let (sin_gamma, cos_gamma) = deg_to_rad(gamma).sin_cos();

        let c_x = c * cos_beta;
        let c_y = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c_z_squared = c * c - c_x * c_x - c_y * c_y;
        if c_z_squared <= 0.0 {
            return Err(AtomError::DegenerateLattice(0.0));
        }

        Self::new([
            [a, 0.0, 0.0],
            [b * cos_gamma, b * sin_gamma, 0.0],
            [c_x, c_y, c_z_squared.sqrt()],
        ])
    }

    /// Re-orient the cell into the standard setting (a along x, b in the
    /// xy-plane), keeping lengths and angles
    pub fn standardized(&self) -> Result<Self> {
        let [a, b, c] = self.length();
        let [alpha, beta, gamma] = self.angle();
        Self::from_lengths_and_angles(a, b, c, alpha, beta, gamma)
    }

    /// The row-wise lattice matrix
    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }

    /// Lattice vector `i` (0 = a, 1 = b, 2 = c)
    pub fn vector(&self, i: usize) -> Vector3D {
        matrix::row(&self.matrix, i)
    }

    /// Lengths |a|, |b|, |c|
    pub fn length(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| self.vector(i).length())
    }

    /// Angles α (b, c), β (a, c) and γ (a, b) in degrees
    pub fn angle(&self) -> [f64; 3] {
        let angle_between = |i: usize, j: usize| {
            let (u, v) = (self.vector(i), self.vector(j));
            let cos = (u.dot(&v) / (u.length() * v.length())).clamp(-1.0, 1.0);
            rad_to_deg(cos.acos())
        };
        [angle_between(1, 2), angle_between(0, 2), angle_between(0, 1)]
    }

    /// Signed cell volume, det(M)
    pub fn volume(&self) -> f64 {
        matrix::determinant(&self.matrix)
    }

    /// The inverse matrix M⁻¹
    pub fn inverse(&self) -> &Matrix3 {
        &self.inverse
    }

    /// Element-wise comparison of two cell matrices within `tolerance` (Å)
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.matrix
            .iter()
            .flatten()
            .zip(other.matrix.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Fractional to Cartesian, `f · M`
    pub fn frac_to_cart(&self, frac: &Vector3D) -> Vector3D {
        matrix::row_times(frac, &self.matrix)
    }

    /// Cartesian to fractional, `r · M⁻¹`
    pub fn cart_to_frac(&self, cart: &Vector3D) -> Vector3D {
        matrix::row_times(cart, &self.inverse)
    }
}

impl PartialEq for Lattice {
    fn eq(&self, other: &Self) -> bool {
        self.matrix == other.matrix
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.matrix {
            writeln!(f, "{:>12.6} {:>12.6} {:>12.6}", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
