/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Periodic structure: a lattice together with its atoms

use super::align::{AlignConfig, Alignment, StructureAligner};
use super::errors::{Result, StructureError};
use super::neighbour::{NeighbourConfig, NeighbourTable};
use crate::atoms::{
    periodic, species_table, Atom, AtomSet, Lattice, Position, SpeciesTable, Vector3D,
};
use crate::utils::constants::OVERLAP_CUTOFF;
use log::info;
use std::fmt;

/// Interpretation of a raw coordinate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordKind {
    Cartesian,
    Fractional,
}

impl CoordKind {
    fn position(self, v: Vector3D) -> Position {
        match self {
            CoordKind::Cartesian => Position::Cartesian(v),
            CoordKind::Fractional => Position::Fractional(v),
        }
    }
}

/// A lattice plus an ordered atom set
///
/// Equality is strict: same lattice matrix, same atoms in the same order with
/// the same coordinates. Use [`Structure::matches`] for the looser "same cell,
/// same species sequence" test.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    lattice: Lattice,
    atoms: AtomSet,
}

impl Structure {
    /// Combine a lattice and an atom set
    ///
    /// The atoms must have been resolved against `lattice`.
    pub fn new(lattice: Lattice, atoms: AtomSet) -> Self {
        Self { lattice, atoms }
    }

    /// Build a structure from parallel species / position lists
    pub fn from_positions(lattice: Lattice, species: &[&str], positions: &[Position]) -> Result<Self> {
        if species.len() != positions.len() {
            return Err(StructureError::CoordinateCountMismatch {
                expected: species.len(),
                found: positions.len(),
            });
        }
        let atoms = species
            .iter()
            .zip(positions)
            .enumerate()
            .map(|(order, (s, p))| Atom::new(s, order, *p, &lattice))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(lattice, AtomSet::from_atoms(atoms)))
    }

    /// Copy `base`, moving every atom to the matching entry of `coords`
    ///
    /// Species, order, selective flags and spin are taken from `base`.
    pub fn from_structure(base: &Structure, coords: &[Vector3D], kind: CoordKind) -> Result<Self> {
        if coords.len() != base.len() {
            return Err(StructureError::CoordinateCountMismatch {
                expected: base.len(),
                found: coords.len(),
            });
        }
        let atoms = base
            .atoms
            .iter()
            .zip(coords)
            .map(|(atom, v)| atom.displaced(kind.position(*v), &base.lattice))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(base.lattice.clone(), AtomSet::new(atoms)?))
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn atoms(&self) -> &AtomSet {
        &self.atoms
    }

    /// Number of atoms
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Cartesian coordinates of all atoms
    pub fn cart_coords(&self) -> Vec<Vector3D> {
        self.atoms.cart_coords()
    }

    /// Same cell (within 1e-6 Å) and same species in the same order
    pub fn matches(&self, other: &Self) -> bool {
        self.lattice.approx_eq(&other.lattice, 1e-6) && self.atoms.species() == other.atoms.species()
    }

    /// Per-atom minimum-image Cartesian difference `self - other`
    ///
    /// Atoms are paired by index; alignment is the caller's job.
    pub fn difference(&self, other: &Self) -> Result<Vec<Vector3D>> {
        self.check_same_size(other)?;
        Ok(self
            .atoms
            .iter()
            .zip(other.atoms.iter())
            .map(|(a, b)| {
                periodic::minimum_image_cartesian_diff(&self.lattice, &b.frac_coord(), &a.frac_coord())
            })
            .collect())
    }

    /// Root of the summed squared per-atom minimum-image distances
    pub fn dist(&self, other: &Self) -> Result<f64> {
        let squared: f64 = self.difference(other)?.iter().map(Vector3D::length_squared).sum();
        Ok(squared.sqrt())
    }

    /// Normalised displacement `(self - other) / dist(self, other)`
    pub fn displacement_mode(&self, other: &Self) -> Result<Vec<Vector3D>> {
        let diff = self.difference(other)?;
        let norm = diff.iter().map(Vector3D::length_squared).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(StructureError::ZeroDisplacement);
        }
        Ok(diff.into_iter().map(|v| v / norm).collect())
    }

    /// Neighbour table against the process-wide species table
    pub fn neighbour_table(&self, config: &NeighbourConfig) -> NeighbourTable {
        NeighbourTable::build(self, config, species_table())
    }

    /// Neighbour table against an explicit species table
    pub fn neighbour_table_with(&self, config: &NeighbourConfig, species: &SpeciesTable) -> NeighbourTable {
        NeighbourTable::build(self, config, species)
    }

    /// Coordination labels (`O2c`, ...) under the default neighbour settings
    pub fn atom_types(&self) -> Vec<String> {
        self.neighbour_table(&NeighbourConfig::default())
            .atom_types(&self.atoms)
    }

    /// Fail if any two atoms are closer than `cutoff` Å
    pub fn check_overlap(&self, cutoff: f64) -> Result<()> {
        let table = self.neighbour_table(&NeighbourConfig::nearest(1));
        if let Some((first, second, distance)) = table.min_distance() {
            if distance <= cutoff {
                return Err(StructureError::Overlap {
                    first,
                    second,
                    distance,
                    cutoff,
                });
            }
        }
        info!("Structure has no overlapping atoms (cutoff {} Å)", cutoff);
        Ok(())
    }

    /// [`check_overlap`](Self::check_overlap) with the default 0.1 Å cutoff
    pub fn check_overlap_default(&self) -> Result<()> {
        self.check_overlap(OVERLAP_CUTOFF)
    }

    /// Reorder `self` and `other` into atom-by-atom correspondence
    pub fn align(&self, other: &Self, config: &AlignConfig) -> Result<Alignment> {
        StructureAligner::new(config.clone()).align(self, other)
    }

    fn check_same_size(&self, other: &Self) -> Result<()> {
        if self.len() != other.len() {
            return Err(StructureError::AtomCountMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lattice:")?;
        write!(f, "{}", self.lattice)?;
        writeln!(f, "Atoms ({}):", self.len())?;
        write!(f, "{}", self.atoms)
    }
}
