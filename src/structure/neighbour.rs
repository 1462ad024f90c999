/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Neighbour tables with bonded / non-bonded classification
//!
//! For every atom `i` the table lists other atoms `j` at their minimum-image
//! position, with the Cartesian displacement to that image and whether the
//! pair counts as bonded:
//!
//! `bonded(i, j) = distance(i, j) <= reference_bond_length(i, j) * bond_tolerance`
//!
//! A table is a snapshot of one structure. It is returned as a value and
//! never written back into the atoms; rebuild it whenever coordinates change.

use super::errors::{Result, StructureError};
use super::structure::Structure;
use crate::atoms::{periodic, AtomSet, SpeciesTable, Vector3D};
use crate::utils::constants::{BOND_TOLERANCE_FACTOR, DEFAULT_NEIGHBOUR_NUM};
use log::debug;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Atom counts above which rows are computed in parallel
const PARALLEL_THRESHOLD: usize = 64;

/// Controls how a neighbour table is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighbourConfig {
    /// Keep at most this many neighbours per atom (`None` keeps all)
    pub neighbour_num: Option<usize>,

    /// Additionally drop neighbours farther than this (Å)
    pub cut_radius: Option<f64>,

    /// List each atom as its own neighbour at distance zero
    pub include_self: bool,

    /// Order each row by increasing distance (otherwise by atom index)
    pub sort: bool,

    /// Multiplier on the reference bond length for the bonded test
    pub bond_tolerance: f64,
}

impl Default for NeighbourConfig {
    fn default() -> Self {
        Self {
            neighbour_num: Some(DEFAULT_NEIGHBOUR_NUM),
            cut_radius: None,
            include_self: false,
            sort: true,
            bond_tolerance: BOND_TOLERANCE_FACTOR,
        }
    }
}

impl NeighbourConfig {
    /// Every atom against every atom (self included), rows in index order;
    /// the layout needed for a full distance matrix
    pub fn full() -> Self {
        Self {
            neighbour_num: None,
            cut_radius: None,
            include_self: true,
            sort: false,
            ..Self::default()
        }
    }

    /// Only the `k` nearest neighbours of each atom
    pub fn nearest(k: usize) -> Self {
        Self {
            neighbour_num: Some(k),
            ..Self::default()
        }
    }
}

/// One entry of a neighbour row
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour {
    /// Index of the neighbouring atom
    pub index: usize,
    /// Minimum-image distance in Å
    pub distance: f64,
    /// Cartesian vector from the atom to the neighbour's chosen image
    pub displacement: Vector3D,
    /// Lattice translation applied to the neighbour
    pub image: [i32; 3],
    /// Whether the pair is classified as bonded
    pub bonded: bool,
}

/// Per-atom neighbour lists, bonds and coordination numbers
#[derive(Debug, Clone, PartialEq)]
pub struct NeighbourTable {
    rows: Vec<Vec<Neighbour>>,
    bonds: Vec<Vec<(usize, f64)>>,
    signatures: Vec<BTreeMap<String, usize>>,
}

impl NeighbourTable {
    /// Build the table for `structure`
    ///
    /// Bonds and coordination numbers are taken from the complete candidate
    /// list, before `neighbour_num` / `cut_radius` trim the stored rows.
    pub fn build(structure: &Structure, config: &NeighbourConfig, species: &SpeciesTable) -> Self {
        let n = structure.len();
        let compute = |i: usize| compute_row(structure, i, config, species);

        let rows: Vec<(Vec<Neighbour>, Vec<(usize, f64)>)> = if n >= PARALLEL_THRESHOLD {
            (0..n).into_par_iter().map(compute).collect()
        } else {
            (0..n).map(compute).collect()
        };

        let atoms = structure.atoms();
        let signatures = rows
            .iter()
            .map(|(_, bonds)| bond_signature(atoms, bonds))
            .collect();
        let (rows, bonds) = rows.into_iter().unzip();

        Self {
            rows,
            bonds,
            signatures,
        }
    }

    /// Number of rows (atoms)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Neighbour row of atom `i`
    pub fn neighbours(&self, i: usize) -> &[Neighbour] {
        &self.rows[i]
    }

    /// Iterate over rows in atom order
    pub fn iter(&self) -> impl Iterator<Item = &[Neighbour]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Bonded partners `(index, distance)` of atom `i`
    pub fn bonds(&self, i: usize) -> &[(usize, f64)] {
        &self.bonds[i]
    }

    /// Number of bonded partners of atom `i`
    pub fn coordination_number(&self, i: usize) -> usize {
        self.bonds[i].len()
    }

    /// Coordination numbers of all atoms
    pub fn coordination_numbers(&self) -> Vec<usize> {
        self.bonds.iter().map(Vec::len).collect()
    }

    /// Species multiset of atom `i`'s bonded partners
    pub fn bond_signature(&self, i: usize) -> &BTreeMap<String, usize> {
        &self.signatures[i]
    }

    /// Labels such as `Ce8c`, `O4c` for every atom of `atoms`
    pub fn atom_types(&self, atoms: &AtomSet) -> Vec<String> {
        atoms
            .iter()
            .zip(self.bonds.iter())
            .map(|(atom, bonds)| atom.atom_type(bonds.len()))
            .collect()
    }

    /// Neighbour indices of every row (adjacency list)
    pub fn index(&self) -> Vec<Vec<usize>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|nb| nb.index).collect())
            .collect()
    }

    /// Stored distances of every row
    pub fn dist(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|nb| nb.distance).collect())
            .collect()
    }

    /// Shortest stored distance in the table together with its atom pair
    pub fn min_distance(&self) -> Option<(usize, usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .filter(move |nb| nb.index != i)
                    .map(move |nb| (i, nb.index, nb.distance))
            })
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))
    }

    /// Full N x N minimum-image distance matrix
    ///
    /// Needs a table that kept every pair, see [`NeighbourConfig::full`].
    pub fn distance_matrix(&self) -> Result<Array2<f64>> {
        let n = self.rows.len();
        let mut matrix = Array2::<f64>::zeros((n, n));
        let mut filled = Array2::<bool>::from_elem((n, n), false);

        for (i, row) in self.rows.iter().enumerate() {
            filled[[i, i]] = true;
            for nb in row {
                matrix[[i, nb.index]] = nb.distance;
                filled[[i, nb.index]] = true;
            }
        }

        if let Some(((i, j), _)) = filled.indexed_iter().find(|(_, present)| !**present) {
            return Err(StructureError::IncompleteNeighbourTable(format!(
                "pair ({}, {}) missing; build with NeighbourConfig::full()",
                i, j
            )));
        }
        Ok(matrix)
    }
}

fn compute_row(
    structure: &Structure,
    i: usize,
    config: &NeighbourConfig,
    species: &SpeciesTable,
) -> (Vec<Neighbour>, Vec<(usize, f64)>) {
    let lattice = structure.lattice();
    let atoms = structure.atoms();
    let atom_i = &atoms[i];
    let frac_i = atom_i.frac_coord();

    let mut row: Vec<Neighbour> = Vec::with_capacity(atoms.len());
    for (j, atom_j) in atoms.iter().enumerate() {
        if i == j && !config.include_self {
            continue;
        }
        let image = atom_i.search_image(atom_j);
        let displacement = lattice.frac_to_cart(&(atom_j.frac_coord() - frac_i))
            + periodic::image_translation(lattice, image);
        let distance = displacement.length();

        let bonded = i != j
            && species
                .reference_bond_length(atom_i.species(), atom_j.species())
                .is_some_and(|reference| distance <= reference * config.bond_tolerance);
        debug!("distance({}, {}) = {:.6} bonded={}", i, j, distance, bonded);

        row.push(Neighbour {
            index: j,
            distance,
            displacement,
            image,
            bonded,
        });
    }

    let bonds = row
        .iter()
        .filter(|nb| nb.bonded)
        .map(|nb| (nb.index, nb.distance))
        .collect();

    if config.sort {
        row.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    }
    if let Some(k) = config.neighbour_num {
        row.truncate(k);
    }
    if let Some(radius) = config.cut_radius {
        row.retain(|nb| nb.distance <= radius);
    }

    (row, bonds)
}

fn bond_signature(atoms: &AtomSet, bonds: &[(usize, f64)]) -> BTreeMap<String, usize> {
    let mut signature = BTreeMap::new();
    for (index, _) in bonds {
        *signature.entry(atoms[*index].species().to_string()).or_insert(0) += 1;
    }
    signature
}
