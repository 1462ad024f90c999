/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Small dense 3x3 matrix helpers
//!
//! Lattices are stored row-wise (rows are the lattice vectors a, b, c), so a
//! fractional row vector `f` maps to Cartesian space as `f · M`.

use crate::atoms::Vector3D;

/// Row-major 3x3 matrix
pub type Matrix3 = [[f64; 3]; 3];

/// Identity matrix
pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Determinant of a 3x3 matrix
pub fn determinant(m: &Matrix3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[2][1] * m[1][2])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Inverse via the adjugate; `None` when the matrix is singular
pub fn inverse(m: &Matrix3) -> Option<Matrix3> {
    let det = determinant(m);
    if det.abs() < f64::EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    Some([
        [
            (m[1][1] * m[2][2] - m[2][1] * m[1][2]) * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[1][0] * m[0][2] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            (m[1][0] * m[2][1] - m[2][0] * m[1][1]) * inv_det,
            (m[2][0] * m[0][1] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[1][0] * m[0][1]) * inv_det,
        ],
    ])
}

/// Matrix product `a · b`
pub fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut result = [[0.0; 3]; 3];
    for (i, row) in result.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    result
}

/// Row vector times matrix, `v · m`
pub fn row_times(v: &Vector3D, m: &Matrix3) -> Vector3D {
    Vector3D::new(
        v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0],
        v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1],
        v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2],
    )
}

/// Row `i` of the matrix as a vector
pub fn row(m: &Matrix3, i: usize) -> Vector3D {
    Vector3D::from_array(m[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_of_triclinic_matrix() {
        let m = [[4.0, 0.0, 0.0], [1.0, 3.0, 0.0], [0.5, 0.7, 5.0]];
        let inv = inverse(&m).unwrap();
        let product = multiply(&inv, &m);

        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(product[i][j], IDENTITY[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]];
        assert_eq!(determinant(&m), 0.0);
        assert!(inverse(&m).is_none());
    }

    #[test]
    fn test_row_times() {
        let m = [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [1.0, 1.0, 4.0]];
        let v = row_times(&Vector3D::new(0.5, 0.5, 0.5), &m);
        assert_relative_eq!(v.x, 1.5);
        assert_relative_eq!(v.y, 2.0);
        assert_relative_eq!(v.z, 2.0);
    }
}
