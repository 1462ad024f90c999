/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Image-dependent pair potential (IDPP) refinement of an interpolated path
//!
//! Every interior image gets a target distance matrix interpolated between
//! the endpoint distance matrices. The objective of image `n` is
//!
//! `S_n = 1/2 Σ_ij w_ij (d_ij - t_ij)²`, with `w_ij = 1 / ((d⁰_ij + t_ij)/2)⁴`
//!
//! where `d⁰` is the starting distance matrix of the image. The sum runs over
//! ordered pairs, so every unordered pair enters twice and `S_n` equals
//! `Σ_{i<j} w_ij (d_ij - t_ij)²`; `IdppResult` objectives use this value.
//!
//! Images relax NEB-style: the perpendicular part of the pair-potential force
//! plus a spring force along the local tangent. See Smidstrup et al., J. Chem. Phys.
//! 140, 214106 (2014) and Henkelman et al., J. Chem. Phys. 113, 9901 (2000).

use super::errors::{PathError, Result};
use super::linear::{check_endpoints, LinearPath};
use crate::atoms::{periodic, Vector3D};
use crate::structure::{CoordKind, NeighbourConfig, Structure};
use crate::utils::constants::IDPP_WEIGHT_EPSILON;
use log::{debug, info, warn};
use ndarray::{s, Array2, Array3, Array4, ArrayView2, Axis, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Relaxation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdppConfig {
    /// Maximum number of relaxation steps
    pub max_iter: usize,

    /// Bound on the summed change of the image objectives between steps
    pub tol: f64,

    /// Bound on the largest total-force component
    pub grad_tol: f64,

    /// Force-to-displacement factor
    pub step_size: f64,

    /// Per-component displacement cap for one step (Å)
    pub max_disp: f64,

    /// Spring constant between neighbouring images
    pub spring_const: f64,
}

impl Default for IdppConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-5,
            grad_tol: 1e-3,
            step_size: 0.05,
            max_disp: 0.05,
            spring_const: 5.0,
        }
    }
}

/// Lifecycle of an [`IdppPath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdppStatus {
    Initialized,
    Iterating,
    /// Both convergence criteria met
    Converged,
    /// Stopped at `max_iter`; the path is still usable
    MaxIterReached,
}

/// Outcome of [`IdppPath::run`]
#[derive(Debug, Clone)]
pub struct IdppResult {
    /// Refined path, endpoints included and unchanged
    pub path: Vec<Structure>,
    pub status: IdppStatus,
    /// Relaxation steps taken
    pub iterations: usize,
    /// Summed objective of the starting images
    pub initial_objective: f64,
    /// Summed objective of the refined images
    pub final_objective: f64,
}

impl IdppResult {
    pub fn converged(&self) -> bool {
        self.status == IdppStatus::Converged
    }
}

/// IDPP relaxation state for one path
#[derive(Debug, Clone)]
pub struct IdppPath {
    structures: Vec<Structure>,
    /// Cartesian coordinates, `(images + 2, atoms, 3)`
    init_coords: Array3<f64>,
    /// Image translations between atom pairs, `(images, atoms, atoms, 3)`
    translations: Array4<f64>,
    /// `(images, atoms, atoms)`
    weights: Array3<f64>,
    /// `(images, atoms, atoms)`
    target_dists: Array3<f64>,
    status: IdppStatus,
}

impl IdppPath {
    /// Set up the relaxation for an initial-guess path (endpoints included)
    pub fn new(structures: Vec<Structure>) -> Result<Self> {
        if structures.len() < 2 {
            return Err(PathError::TooFewStructures(structures.len()));
        }
        let first = &structures[0];
        for other in &structures[1..] {
            check_endpoints(first, other)?;
        }

        let n_atoms = first.len();
        let images = structures.len() - 2;
        let lattice = first.lattice();

        // distance matrices of every structure are independent of each other
        let config = NeighbourConfig::full();
        let dists = structures
            .par_iter()
            .map(|s| s.neighbour_table(&config).distance_matrix())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let (d_start, d_end) = (&dists[0], &dists[images + 1]);
        let eye = Array2::<f64>::eye(n_atoms);

        let mut target_dists = Array3::<f64>::zeros((images, n_atoms, n_atoms));
        let mut weights = Array3::<f64>::zeros((images, n_atoms, n_atoms));
        for ni in 0..images {
            let fraction = (ni + 1) as f64 / (images + 1) as f64;
            let target = d_start + &((d_end - d_start) * fraction);
            let avg = (&target + &dists[ni + 1]) / 2.0;
            let weight = (avg.mapv(|d| d.powi(4)) + &eye * IDPP_WEIGHT_EPSILON).mapv(f64::recip);

            target_dists.index_axis_mut(Axis(0), ni).assign(&target);
            weights.index_axis_mut(Axis(0), ni).assign(&weight);
        }

        // every structure is placed in the frame of the one before it, so an
        // atom crossing a cell face keeps moving continuously along the path
        let mut frames: Vec<Vec<Vector3D>> = Vec::with_capacity(images + 2);
        frames.push(first.cart_coords());
        for pair in structures.windows(2) {
            let step = pair[1].difference(&pair[0])?;
            let previous = &frames[frames.len() - 1];
            let next: Vec<Vector3D> = previous.iter().zip(&step).map(|(r, d)| *r + *d).collect();
            frames.push(next);
        }

        let mut init_coords = Array3::<f64>::zeros((images + 2, n_atoms, 3));
        for (ni, frame) in frames.iter().enumerate() {
            for (i, cart) in frame.iter().enumerate() {
                init_coords
                    .slice_mut(s![ni, i, ..])
                    .assign(&ndarray::arr1(&cart.to_array()));
            }
        }

        // images are taken between the unwrapped positions that the
        // relaxation actually moves, not the wrapped fractional ones
        let mut translations = Array4::<f64>::zeros((images, n_atoms, n_atoms, 3));
        for ni in 0..images {
            let unwrapped: Vec<Vector3D> = frames[ni + 1]
                .iter()
                .map(|r| lattice.cart_to_frac(r))
                .collect();
            for i in 0..n_atoms {
                for j in (i + 1)..n_atoms {
                    let image = periodic::search_image(&unwrapped[i], &unwrapped[j]);
                    let t = periodic::image_translation(lattice, image).to_array();
                    for k in 0..3 {
                        translations[[ni, i, j, k]] = t[k];
                        translations[[ni, j, i, k]] = -t[k];
                    }
                }
            }
        }

        debug!("IDPP set up for {} images of {} atoms", images, n_atoms);

        Ok(Self {
            structures,
            init_coords,
            translations,
            weights,
            target_dists,
            status: IdppStatus::Initialized,
        })
    }

    /// Linear interpolation followed by IDPP set-up
    pub fn from_linear(start: &Structure, end: &Structure, n_images: usize) -> Result<Self> {
        Self::new(LinearPath::new(start, end, n_images)?.into_images())
    }

    pub fn status(&self) -> IdppStatus {
        self.status
    }

    /// Number of interior images
    pub fn n_images(&self) -> usize {
        self.structures.len() - 2
    }

    /// Per-image interpolated target distance matrices
    pub fn target_dists(&self) -> &Array3<f64> {
        &self.target_dists
    }

    /// Objective of every interior image at the starting coordinates
    pub fn initial_objectives(&self) -> Vec<f64> {
        self.objectives_and_forces(&self.init_coords)
            .into_iter()
            .map(|(func, _)| func)
            .collect()
    }

    /// Relax the interior images
    pub fn run(&mut self, config: &IdppConfig) -> Result<IdppResult> {
        let images = self.n_images();
        let mut coords = self.init_coords.clone();
        let mut old_funcs = vec![0.0; images];
        let initial_objective: f64 = self.initial_objectives().iter().sum();

        self.status = IdppStatus::Iterating;
        let mut iterations = 0;
        let mut converged = images == 0;

        while !converged && iterations < config.max_iter {
            iterations += 1;

            let (funcs, true_forces): (Vec<f64>, Vec<Array2<f64>>) =
                self.objectives_and_forces(&coords).into_iter().unzip();
            let total_forces = self.total_forces(&coords, &true_forces, config.spring_const);

            let mut max_force = 0.0_f64;
            for (ni, force) in total_forces.iter().enumerate() {
                max_force = force.iter().fold(max_force, |m, f| m.max(f.abs()));
                let disp = force.mapv(|f| (config.step_size * f).clamp(-config.max_disp, config.max_disp));
                let mut image = coords.index_axis_mut(Axis(0), ni + 1);
                image += &disp;
            }

            let residual: f64 = old_funcs
                .iter()
                .zip(&funcs)
                .map(|(old, new)| (old - new).abs())
                .sum();
            debug!(
                "IDPP step {}: objective change {:.3e}, max force {:.3e}",
                iterations, residual, max_force
            );

            converged = residual < config.tol && max_force < config.grad_tol;
            old_funcs = funcs;
        }

        self.status = if converged {
            info!("IDPP converged after {} steps", iterations);
            IdppStatus::Converged
        } else {
            warn!(
                "IDPP reached the maximum of {} steps without converging",
                config.max_iter
            );
            IdppStatus::MaxIterReached
        };

        let final_objective: f64 = self
            .objectives_and_forces(&coords)
            .iter()
            .map(|(func, _)| func)
            .sum();

        let mut path = Vec::with_capacity(images + 2);
        path.push(self.structures[0].clone());
        for ni in 1..=images {
            let cart: Vec<Vector3D> = coords
                .index_axis(Axis(0), ni)
                .outer_iter()
                .map(|row| Vector3D::new(row[0], row[1], row[2]))
                .collect();
            path.push(Structure::from_structure(
                &self.structures[ni],
                &cart,
                CoordKind::Cartesian,
            )?);
        }
        path.push(self.structures[images + 1].clone());

        Ok(IdppResult {
            path,
            status: self.status,
            iterations,
            initial_objective,
            final_objective,
        })
    }

    /// Objective and true force `(atoms, 3)` of every interior image
    fn objectives_and_forces(&self, coords: &Array3<f64>) -> Vec<(f64, Array2<f64>)> {
        (0..self.n_images())
            .into_par_iter()
            .map(|ni| self.image_objective_and_force(coords, ni))
            .collect()
    }

    fn image_objective_and_force(&self, coords: &Array3<f64>, ni: usize) -> (f64, Array2<f64>) {
        let x = coords.index_axis(Axis(0), ni + 1);
        let translations = self.translations.index_axis(Axis(0), ni);
        let weights = self.weights.index_axis(Axis(0), ni);
        let targets = self.target_dists.index_axis(Axis(0), ni);
        let n_atoms = x.nrows();

        let mut func = 0.0;
        let mut grad = Array2::<f64>::zeros((n_atoms, 3));
        for i in 0..n_atoms {
            for j in 0..n_atoms {
                let vec: [f64; 3] =
                    std::array::from_fn(|k| x[[i, k]] - x[[j, k]] - translations[[i, j, k]]);
                let trial = vec.iter().map(|v| v * v).sum::<f64>().sqrt();
                let eye = if i == j { 1.0 } else { 0.0 };
                let mismatch = trial - targets[[i, j]];

                func += weights[[i, j]] * mismatch * mismatch;
                let aux = mismatch * weights[[i, j]] / (trial + eye);
                for k in 0..3 {
                    grad[[i, k]] += aux * vec[k];
                }
            }
        }

        (0.5 * func, grad * -2.0)
    }

    /// True force perpendicular to the local tangent plus the spring force
    /// along it
    fn total_forces(
        &self,
        coords: &Array3<f64>,
        true_forces: &[Array2<f64>],
        spring_const: f64,
    ) -> Vec<Array2<f64>> {
        true_forces
            .iter()
            .enumerate()
            .map(|(idx, true_force)| {
                let ni = idx + 1;
                let prev = coords.index_axis(Axis(0), ni - 1);
                let here = coords.index_axis(Axis(0), ni);
                let next = coords.index_axis(Axis(0), ni + 1);

                let vec1 = &next - &here;
                let vec2 = &here - &prev;
                let tangent = unit(&(unit(&vec1.view()) + unit(&vec2.view())).view());

                let spring = (norm(&vec1.view()) - norm(&vec2.view())) * spring_const;
                let parallel = (true_force * &tangent).sum();

                let mut total = true_force.clone();
                Zip::from(&mut total)
                    .and(&tangent)
                    .for_each(|f, &t| *f += (spring - parallel) * t);
                total
            })
            .collect()
    }
}

fn norm(v: &ArrayView2<f64>) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Unit vector of `v`, or zero when `v` vanishes
fn unit(v: &ArrayView2<f64>) -> Array2<f64> {
    let length = norm(v);
    if length == 0.0 {
        Array2::zeros(v.raw_dim())
    } else {
        v.mapv(|x| x / length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{Lattice, Position};
    use approx::assert_relative_eq;

    fn dimer_at(a: [f64; 3], b: [f64; 3]) -> Structure {
        Structure::from_positions(
            Lattice::cubic(10.0).unwrap(),
            &["N", "N"],
            &[
                Position::Cartesian(Vector3D::from_array(a)),
                Position::Cartesian(Vector3D::from_array(b)),
            ],
        )
        .unwrap()
    }

    fn dimer(b: [f64; 3]) -> Structure {
        dimer_at([5.0, 5.0, 5.0], b)
    }

    #[test]
    fn test_target_distances_are_interpolated() {
        let start = dimer([6.0, 5.0, 5.0]);
        let end = dimer([8.0, 5.0, 5.0]);
        let idpp = IdppPath::from_linear(&start, &end, 3).unwrap();

        assert_eq!(idpp.n_images(), 3);
        assert_eq!(idpp.status(), IdppStatus::Initialized);
        let targets = idpp.target_dists();
        assert_relative_eq!(targets[[0, 0, 1]], 1.5, epsilon = 1e-12);
        assert_relative_eq!(targets[[1, 1, 0]], 2.0, epsilon = 1e-12);
        assert_relative_eq!(targets[[2, 0, 1]], 2.5, epsilon = 1e-12);
        assert_eq!(targets[[1, 0, 0]], 0.0);
    }

    #[test]
    fn test_linear_stretch_is_already_optimal() {
        let idpp = IdppPath::from_linear(&dimer([6.0, 5.0, 5.0]), &dimer([8.0, 5.0, 5.0]), 3).unwrap();
        for func in idpp.initial_objectives() {
            assert_relative_eq!(func, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rotation_restores_bond_length() {
        let start = dimer([6.5, 5.0, 5.0]);
        let end = dimer([5.0, 6.5, 5.0]);
        let mut idpp = IdppPath::from_linear(&start, &end, 1).unwrap();

        let result = idpp.run(&IdppConfig::default()).unwrap();
        assert!(result.converged());
        assert_eq!(idpp.status(), IdppStatus::Converged);
        assert!(result.final_objective < result.initial_objective);

        let middle = &result.path[1];
        let bond = middle.atoms()[0].distance_to(&middle.atoms()[1], middle.lattice());
        assert_relative_eq!(bond, 1.5, epsilon = 1e-2);

        assert_eq!(result.path[0], start);
        assert_eq!(result.path[2], end);
    }

    #[test]
    fn test_rigid_shift_through_cell_face_stays_linear() {
        let start = dimer_at([9.5, 5.0, 5.0], [9.5, 6.2, 5.0]);
        let end = dimer_at([0.5, 5.0, 5.0], [0.5, 6.2, 5.0]);
        let linear = LinearPath::new(&start, &end, 3).unwrap();

        let mut idpp = IdppPath::new(linear.images().to_vec()).unwrap();
        let result = idpp.run(&IdppConfig::default()).unwrap();

        assert!(result.converged());
        assert_relative_eq!(result.final_objective, 0.0, epsilon = 1e-12);
        for (relaxed, guess) in result.path.iter().zip(linear.images()) {
            assert!(relaxed.dist(guess).unwrap() < 1e-6);
        }
    }

    #[test]
    fn test_max_iter_is_not_an_error() {
        let mut idpp = IdppPath::from_linear(&dimer([6.5, 5.0, 5.0]), &dimer([5.0, 6.5, 5.0]), 1).unwrap();
        let config = IdppConfig {
            max_iter: 2,
            ..IdppConfig::default()
        };
        let result = idpp.run(&config).unwrap();
        assert_eq!(result.status, IdppStatus::MaxIterReached);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.path.len(), 3);
    }

    #[test]
    fn test_too_few_structures() {
        assert!(matches!(
            IdppPath::new(vec![dimer([6.0, 5.0, 5.0])]),
            Err(PathError::TooFewStructures(1))
        ));
    }
}
