/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Ordered collection of atoms belonging to one structure

use super::atom::Atom;
use super::errors::{AtomError, Result};
use super::vector::Vector3D;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Index;

/// An ordered sequence of atoms
///
/// Order is the identity used for cross-referencing with file formats and
/// neighbour tables; every atom's `order` is unique within the set. Two sets
/// holding the same atoms in a different order describe the same physical
/// structure, which is what structure alignment resolves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomSet {
    atoms: Vec<Atom>,
}

impl AtomSet {
    /// Create a set from atoms whose `order` fields are already unique
    pub fn new(atoms: Vec<Atom>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(atoms.len());
        for atom in &atoms {
            if !seen.insert(atom.order()) {
                return Err(AtomError::InvalidAtomSet(format!(
                    "duplicate atom order {}",
                    atom.order()
                )));
            }
        }
        Ok(Self { atoms })
    }

    /// Create a set from atoms in the given sequence, renumbering `order`
    /// to 0..N-1
    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        let atoms = atoms
            .into_iter()
            .enumerate()
            .map(|(order, mut atom)| {
                atom.set_order(order);
                atom
            })
            .collect();
        Self { atoms }
    }

    /// Number of atoms
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Whether the set holds no atoms
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Atom at `index`
    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Read-only view of the atoms
    pub fn as_slice(&self) -> &[Atom] {
        &self.atoms
    }

    /// Iterate over the atoms in order
    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    /// Species labels in set order
    pub fn species(&self) -> Vec<&str> {
        self.atoms.iter().map(Atom::species).collect()
    }

    /// Consecutive runs of identical species, e.g. `[("Ce", 4), ("O", 8)]`
    pub fn elements(&self) -> Vec<(String, usize)> {
        let mut runs: Vec<(String, usize)> = Vec::new();
        for atom in &self.atoms {
            match runs.last_mut() {
                Some((species, count)) if species == atom.species() => *count += 1,
                _ => runs.push((atom.species().to_string(), 1)),
            }
        }
        runs
    }

    /// Atom count per species
    pub fn size(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.species().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Wrapped fractional coordinates in set order
    pub fn frac_coords(&self) -> Vec<Vector3D> {
        self.atoms.iter().map(Atom::frac_coord).collect()
    }

    /// Cartesian coordinates in set order
    pub fn cart_coords(&self) -> Vec<Vector3D> {
        self.atoms.iter().map(Atom::cart_coord).collect()
    }

    /// Whether any atom carries selective-dynamics flags
    pub fn has_selective(&self) -> bool {
        self.atoms.iter().any(|atom| atom.selective().is_some())
    }

    /// Consume the set, returning the atoms
    pub fn into_atoms(self) -> Vec<Atom> {
        self.atoms
    }
}

impl Index<usize> for AtomSet {
    type Output = Atom;

    fn index(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }
}

impl<'a> IntoIterator for &'a AtomSet {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

impl fmt::Display for AtomSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for atom in &self.atoms {
            writeln!(f, "{}", atom)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{Lattice, Position};

    fn atoms(species: &[&str]) -> Vec<Atom> {
        let lattice = Lattice::cubic(5.0).unwrap();
        species
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let frac = Vector3D::new(i as f64 * 0.1, 0.0, 0.0);
                Atom::new(s, i, Position::Fractional(frac), &lattice).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_elements_and_size() {
        let set = AtomSet::new(atoms(&["Ce", "Ce", "O", "O", "O", "Ce"])).unwrap();

        assert_eq!(set.len(), 6);
        assert_eq!(
            set.elements(),
            vec![("Ce".to_string(), 2), ("O".to_string(), 3), ("Ce".to_string(), 1)]
        );
        assert_eq!(set.size().get("Ce"), Some(&3));
        assert_eq!(set.size().get("O"), Some(&3));
        assert_eq!(set.species(), vec!["Ce", "Ce", "O", "O", "O", "Ce"]);
    }

    #[test]
    fn test_duplicate_order_is_rejected() {
        let mut list = atoms(&["O", "O"]);
        list[1].set_order(0);
        assert!(AtomSet::new(list).is_err());
    }

    #[test]
    fn test_from_atoms_renumbers() {
        let mut list = atoms(&["O", "H", "H"]);
        list.reverse();
        let set = AtomSet::from_atoms(list);
        let orders: Vec<usize> = set.iter().map(Atom::order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(set[0].species(), "H");
    }

    #[test]
    fn test_nested_iteration() {
        let set = AtomSet::from_atoms(atoms(&["O", "H", "H"]));
        let pairs = set
            .iter()
            .flat_map(|a| set.iter().map(move |b| (a.order(), b.order())))
            .count();
        assert_eq!(pairs, 9);
    }
}
