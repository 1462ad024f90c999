/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Linear interpolation between two aligned endpoint structures

use super::errors::{PathError, Result};
use crate::atoms::Vector3D;
use crate::structure::{CoordKind, Structure};
use log::debug;

/// A straight-line path in Cartesian space
///
/// Holds `n + 2` structures: the start, `n` interior images and the end.
/// The endpoints are stored as given; image `k` places every atom at
/// `start + k * delta`, where `delta` is the minimum-image difference
/// `end - start` divided by `n + 1`.
#[derive(Debug, Clone)]
pub struct LinearPath {
    images: Vec<Structure>,
}

impl LinearPath {
    /// Interpolate `n_images` interior structures between `start` and `end`
    ///
    /// Both endpoints must share the cell and the per-atom species sequence.
    pub fn new(start: &Structure, end: &Structure, n_images: usize) -> Result<Self> {
        check_endpoints(start, end)?;

        let steps = (n_images + 1) as f64;
        let delta: Vec<Vector3D> = end
            .difference(start)?
            .into_iter()
            .map(|d| d / steps)
            .collect();
        let origin = start.cart_coords();

        let mut images = Vec::with_capacity(n_images + 2);
        images.push(start.clone());
        for k in 1..=n_images {
            let coords: Vec<Vector3D> = origin
                .iter()
                .zip(&delta)
                .map(|(r, d)| *r + *d * k as f64)
                .collect();
            images.push(Structure::from_structure(start, &coords, CoordKind::Cartesian)?);
        }
        images.push(end.clone());

        debug!("Linear path with {} interior images", n_images);
        Ok(Self { images })
    }

    /// All structures, endpoints included
    pub fn images(&self) -> &[Structure] {
        &self.images
    }

    pub fn into_images(self) -> Vec<Structure> {
        self.images
    }

    /// Number of structures, endpoints included
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of interior images
    pub fn n_images(&self) -> usize {
        self.images.len().saturating_sub(2)
    }
}

/// Reject endpoints that cannot be interpolated atom-by-atom
pub(crate) fn check_endpoints(start: &Structure, end: &Structure) -> Result<()> {
    if start.len() != end.len() {
        return Err(PathError::StructureMismatch(format!(
            "{} atoms vs {} atoms",
            start.len(),
            end.len()
        )));
    }
    if !start.matches(end) {
        return Err(PathError::StructureMismatch(
            "different cells or species order; align the structures first".to_string(),
        ));
    }
    Ok(())
}
