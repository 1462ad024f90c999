/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Atom correspondence between two structures of the same composition
//!
//! Matching runs in two greedy passes over the reference atoms:
//!
//! 1. a tight distance tolerance, additionally requiring equal bond
//!    signatures (species multiset of bonded neighbours), so that atoms in a
//!    well-defined chemical environment are matched by chemistry;
//! 2. a loose tolerance over whatever is left, on distance alone. When the
//!    loose tolerance reaches `signature_threshold` the pass is a catch-all:
//!    every leftover atom takes its nearest free candidate, however far.
//!
//! The result is deterministic but not a global optimum.

use super::errors::{Result, StructureError};
use super::neighbour::{NeighbourConfig, NeighbourTable};
use super::structure::Structure;
use crate::atoms::{periodic, species_table, AtomSet, SpeciesTable};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Tolerances for [`StructureAligner`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// First-pass distance tolerance (Å)
    pub tight_tolerance: f64,

    /// Second-pass distance tolerance (Å)
    pub loose_tolerance: f64,

    /// Passes whose tolerance reaches this value skip the bond-signature check
    /// and the distance cap
    pub signature_threshold: f64,

    /// Allowed element-wise difference between the two lattice matrices (Å)
    pub lattice_tolerance: f64,

    /// Neighbour settings used to derive bond signatures
    pub neighbour: NeighbourConfig,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            tight_tolerance: 0.2,
            loose_tolerance: 100.0,
            signature_threshold: 10.0,
            lattice_tolerance: 1e-6,
            neighbour: NeighbourConfig::default(),
        }
    }
}

/// Outcome of an alignment
#[derive(Debug, Clone)]
pub struct Alignment {
    /// Reference structure in matched order
    pub reference: Structure,
    /// Second structure reordered to correspond atom-by-atom with `reference`
    pub aligned: Structure,
    /// `(reference index, other index)` of each matched pair, in output order
    pub permutation: Vec<(usize, usize)>,
}

impl Alignment {
    /// Whether both structures kept their original order
    pub fn is_identity(&self) -> bool {
        self.permutation
            .iter()
            .enumerate()
            .all(|(k, &(i, j))| i == k && j == k)
    }

    /// `Structure::dist` between the aligned pair
    pub fn distance(&self) -> Result<f64> {
        self.reference.dist(&self.aligned)
    }
}

/// Greedy two-pass structure aligner
#[derive(Debug, Clone, Default)]
pub struct StructureAligner {
    config: AlignConfig,
}

impl StructureAligner {
    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Align `other` onto `reference` using the process-wide species table
    pub fn align(&self, reference: &Structure, other: &Structure) -> Result<Alignment> {
        self.align_with(reference, other, species_table())
    }

    /// Align `other` onto `reference` using an explicit species table
    pub fn align_with(
        &self,
        reference: &Structure,
        other: &Structure,
        species: &SpeciesTable,
    ) -> Result<Alignment> {
        self.check_compatible(reference, other)?;

        let (table_ref, table_other) = rayon::join(
            || NeighbourTable::build(reference, &self.config.neighbour, species),
            || NeighbourTable::build(other, &self.config.neighbour, species),
        );

        let mut taken = vec![false; other.len()];
        let all: Vec<usize> = (0..reference.len()).collect();

        let (mut permutation, leftover) = self.matching_pass(
            reference,
            other,
            (&table_ref, &table_other),
            &all,
            &mut taken,
            self.config.tight_tolerance,
        );
        debug!(
            "First pass matched {} atoms, {} left",
            permutation.len(),
            leftover.len()
        );

        let (second, unmatched) = self.matching_pass(
            reference,
            other,
            (&table_ref, &table_other),
            &leftover,
            &mut taken,
            self.config.loose_tolerance,
        );
        permutation.extend(second);

        if !unmatched.is_empty() {
            return Err(StructureError::CompositionMismatch(format!(
                "{} atom(s) without a counterpart, first is reference atom {}",
                unmatched.len(),
                unmatched[0]
            )));
        }

        let reference_atoms = permutation
            .iter()
            .map(|&(i, _)| reference.atoms()[i].clone())
            .collect();
        let other_atoms = permutation
            .iter()
            .map(|&(_, j)| other.atoms()[j].clone())
            .collect();

        let alignment = Alignment {
            reference: Structure::new(reference.lattice().clone(), AtomSet::from_atoms(reference_atoms)),
            aligned: Structure::new(other.lattice().clone(), AtomSet::from_atoms(other_atoms)),
            permutation,
        };

        info!("Distance before alignment: {:.6}", reference.dist(other)?);
        info!("Distance after alignment:  {:.6}", alignment.distance()?);

        Ok(alignment)
    }

    fn check_compatible(&self, reference: &Structure, other: &Structure) -> Result<()> {
        if !reference
            .lattice()
            .approx_eq(other.lattice(), self.config.lattice_tolerance)
        {
            return Err(StructureError::LatticeMismatch);
        }

        let (left, right) = (reference.atoms().size(), other.atoms().size());
        if left != right {
            return Err(StructureError::CompositionMismatch(format!(
                "{:?} vs {:?}",
                left, right
            )));
        }
        Ok(())
    }

    /// Match each of `candidates` (reference indices, in order) to the nearest
    /// free atom of `other` within `tolerance` (unbounded once `tolerance`
    /// reaches `signature_threshold`)
    ///
    /// Returns the matched pairs and the reference indices left unmatched.
    fn matching_pass(
        &self,
        reference: &Structure,
        other: &Structure,
        tables: (&NeighbourTable, &NeighbourTable),
        candidates: &[usize],
        taken: &mut [bool],
        tolerance: f64,
    ) -> (Vec<(usize, usize)>, Vec<usize>) {
        // a tight pass filters on chemistry and distance, a loose one on neither
        let tight = tolerance < self.config.signature_threshold;
        let lattice = reference.lattice();
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();

        for &i in candidates {
            let a = &reference.atoms()[i];
            let mut best: Option<(usize, f64)> = None;

            for (j, b) in other.atoms().iter().enumerate() {
                if taken[j] || a.species() != b.species() {
                    continue;
                }
                if tight && tables.0.bond_signature(i) != tables.1.bond_signature(j) {
                    continue;
                }
                let distance = periodic::minimum_image_distance(lattice, &a.frac_coord(), &b.frac_coord());
                if tight && distance > tolerance {
                    continue;
                }
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((j, distance));
                }
            }

            match best {
                Some((j, distance)) => {
                    debug!("Matched atom {} -> {} ({:.4} Å)", i, j, distance);
                    taken[j] = true;
                    matched.push((i, j));
                }
                None => unmatched.push(i),
            }
        }

        (matched, unmatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{Lattice, Position, Vector3D};
    use approx::assert_relative_eq;

    fn build(species: &[&str], coords: &[[f64; 3]]) -> Structure {
        let positions: Vec<Position> = coords
            .iter()
            .map(|c| Position::Fractional(Vector3D::from_array(*c)))
            .collect();
        Structure::from_positions(Lattice::cubic(8.0).unwrap(), species, &positions).unwrap()
    }

    #[test]
    fn test_identical_structures_align_to_identity() {
        let s = build(&["Cu", "O", "O"], &[[0.0, 0.0, 0.0], [0.2, 0.0, 0.0], [0.0, 0.2, 0.0]]);
        let alignment = StructureAligner::default().align(&s, &s).unwrap();

        assert!(alignment.is_identity());
        assert_relative_eq!(alignment.distance().unwrap(), 0.0);
        assert_eq!(alignment.reference, s);
    }

    #[test]
    fn test_reordered_atoms_are_recovered() {
        let reference = build(
            &["Cu", "O", "O"],
            &[[0.0, 0.0, 0.0], [0.2, 0.0, 0.0], [0.0, 0.6, 0.0]],
        );
        let shuffled = build(
            &["O", "Cu", "O"],
            &[[0.01, 0.6, 0.0], [0.0, 0.0, 0.01], [0.2, 0.01, 0.0]],
        );

        let alignment = StructureAligner::default().align(&reference, &shuffled).unwrap();
        assert_eq!(alignment.aligned.atoms().species(), vec!["Cu", "O", "O"]);
        assert!(alignment.distance().unwrap() < 0.2);
        let others: Vec<usize> = alignment.permutation.iter().map(|&(_, j)| j).collect();
        assert_eq!(others, vec![1, 2, 0]);
    }

    #[test]
    fn test_far_atoms_fall_through_to_second_pass() {
        let reference = build(&["O", "O"], &[[0.1, 0.1, 0.1], [0.5, 0.5, 0.5]]);
        let moved = build(&["O", "O"], &[[0.5, 0.5, 0.52], [0.3, 0.1, 0.1]]);

        let alignment = StructureAligner::default().align(&reference, &moved).unwrap();
        // atom 1 matches within the tight tolerance, atom 0 only in the loose pass
        assert_eq!(alignment.permutation, vec![(1, 0), (0, 1)]);
        assert_eq!(alignment.reference.atoms()[0].order(), 0);
    }

    #[test]
    fn test_loose_pass_has_no_distance_cap() {
        let lattice = Lattice::cubic(250.0).unwrap();
        let place = |xs: [f64; 2]| {
            let positions: Vec<Position> = xs
                .iter()
                .map(|&x| Position::Cartesian(Vector3D::new(x, 10.0, 10.0)))
                .collect();
            Structure::from_positions(lattice.clone(), &["O", "O"], &positions).unwrap()
        };
        let reference = place([10.0, 50.0]);
        let moved = place([10.0, 168.0]);

        let alignment = StructureAligner::default().align(&reference, &moved).unwrap();
        assert_eq!(alignment.permutation, vec![(0, 0), (1, 1)]);
        assert_relative_eq!(alignment.distance().unwrap(), 118.0, epsilon = 1e-9);
    }

    #[test]
    fn test_capped_loose_pass_reports_leftovers() {
        let lattice = Lattice::cubic(250.0).unwrap();
        let place = |x: f64| {
            Structure::from_positions(
                lattice.clone(),
                &["O"],
                &[Position::Cartesian(Vector3D::new(x, 10.0, 10.0))],
            )
            .unwrap()
        };
        let config = AlignConfig {
            loose_tolerance: 5.0,
            ..AlignConfig::default()
        };
        assert!(matches!(
            StructureAligner::new(config).align(&place(10.0), &place(30.0)),
            Err(StructureError::CompositionMismatch(_))
        ));
    }

    #[test]
    fn test_composition_mismatch() {
        let a = build(&["O", "O"], &[[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]);
        let b = build(&["O", "H"], &[[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]);
        assert!(matches!(
            StructureAligner::default().align(&a, &b),
            Err(StructureError::CompositionMismatch(_))
        ));
    }

    #[test]
    fn test_lattice_mismatch() {
        let a = build(&["O"], &[[0.0, 0.0, 0.0]]);
        let b = Structure::from_positions(
            Lattice::cubic(9.0).unwrap(),
            &["O"],
            &[Position::Fractional(Vector3D::origin())],
        )
        .unwrap();
        assert!(matches!(
            StructureAligner::default().align(&a, &b),
            Err(StructureError::LatticeMismatch)
        ));
    }
}
