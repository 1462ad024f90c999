/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

use approx::assert_relative_eq;
use gvasp_rs::atoms::{Atom, AtomSet, Lattice, Position, SpeciesTable, Vector3D};
use gvasp_rs::structure::{AlignConfig, CoordKind, Structure, StructureAligner, StructureError};

/// Conventional rock-salt NaCl cell doubled along x (16 atoms)
fn nacl() -> Structure {
    let fcc = [[0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]];
    let mut species = Vec::new();
    let mut positions = Vec::new();
    for (name, offset) in [("Na", 0.0), ("Cl", 0.5)] {
        for cell in 0..2 {
            for site in &fcc {
                let frac = Vector3D::new(
                    ((site[0] + offset) % 1.0 + cell as f64) / 2.0,
                    site[1],
                    site[2],
                );
                species.push(name);
                positions.push(Position::Fractional(frac));
            }
        }
    }
    Structure::from_positions(Lattice::orthorhombic(11.28, 5.64, 5.64).unwrap(), &species, &positions).unwrap()
}

/// Small deterministic rattle, at most ~0.035 Å per atom
fn rattled(structure: &Structure) -> Structure {
    let coords: Vec<Vector3D> = structure
        .cart_coords()
        .into_iter()
        .enumerate()
        .map(|(k, r)| {
            let t = k as f64;
            r + Vector3D::new(t.sin(), t.cos(), (2.0 * t).sin()) * 0.02
        })
        .collect();
    Structure::from_structure(structure, &coords, CoordKind::Cartesian).unwrap()
}

/// Same atoms listed in reverse order
fn reversed(structure: &Structure) -> Structure {
    let atoms: Vec<Atom> = structure.atoms().iter().rev().cloned().collect();
    Structure::new(structure.lattice().clone(), AtomSet::from_atoms(atoms))
}

#[test]
fn test_alignment_is_idempotent() {
    let reference = nacl();
    let moved = reversed(&rattled(&reference));
    let aligner = StructureAligner::default();

    let first = aligner.align(&reference, &moved).unwrap();
    let second = aligner.align(&first.reference, &first.aligned).unwrap();

    assert!(second.is_identity());
    assert_eq!(second.reference, first.reference);
    assert_eq!(second.aligned, first.aligned);
}

#[test]
fn test_alignment_recovers_shuffled_order() {
    let reference = nacl();
    let displaced = rattled(&reference);
    let shuffled = reversed(&displaced);

    let alignment = StructureAligner::default().align(&reference, &shuffled).unwrap();
    let n = reference.len();

    assert_eq!(alignment.permutation.len(), n);
    for &(i, j) in &alignment.permutation {
        assert_eq!(j, n - 1 - i);
    }

    let before = reference.dist(&shuffled).unwrap();
    let after = alignment.distance().unwrap();
    assert!(after <= before);
    assert_relative_eq!(after, reference.dist(&displaced).unwrap(), epsilon = 1e-10);
}

#[test]
fn test_alignment_keeps_species_sequence() {
    let reference = nacl();
    let alignment = reference
        .align(&reversed(&reference), &AlignConfig::default())
        .unwrap();

    assert_eq!(
        alignment.reference.atoms().species(),
        alignment.aligned.atoms().species()
    );
    assert!(alignment.reference.matches(&alignment.aligned));
    assert!(alignment.distance().unwrap() < 1e-10);
}

#[test]
fn test_bond_signature_beats_nearer_candidate() {
    // only O-H pairs can bond
    let table = SpeciesTable::from_json(
        r#"{ "species": {
            "O": { "atomic_number": 8, "bonds": { "H": 1.0 } },
            "H": { "atomic_number": 1 }
        } }"#,
    )
    .unwrap();
    let build = |coords: [[f64; 3]; 3]| {
        let positions: Vec<Position> = coords
            .iter()
            .map(|c| Position::Cartesian(Vector3D::from_array(*c)))
            .collect();
        Structure::from_positions(Lattice::cubic(20.0).unwrap(), &["O", "O", "H"], &positions).unwrap()
    };

    // hydroxyl oxygen, a lone oxygen far away, the hydroxyl hydrogen
    let reference = build([[5.0, 5.0, 5.0], [12.0, 12.0, 12.0], [5.0, 6.0, 5.0]]);
    // a lone oxygen 0.05 Å from the reference hydroxyl oxygen and a bonded
    // one 0.1 Å away on the other side
    let other = build([[5.05, 5.0, 5.0], [4.9, 5.0, 5.0], [3.9, 5.0, 5.0]]);

    let aligner = StructureAligner::default();
    let alignment = aligner.align_with(&reference, &other, &table).unwrap();

    assert_eq!(alignment.permutation[0], (0, 1));
    assert!(alignment.permutation.contains(&(1, 0)));
    assert!(alignment.permutation.contains(&(2, 2)));
}

#[test]
fn test_mismatched_composition_is_rejected() {
    let reference = nacl();
    let coords = reference.cart_coords();
    let mut species: Vec<&str> = reference.atoms().species();
    species[0] = "K";
    let positions: Vec<Position> = coords.into_iter().map(Position::Cartesian).collect();
    let other = Structure::from_positions(reference.lattice().clone(), &species, &positions).unwrap();

    assert!(matches!(
        StructureAligner::default().align(&reference, &other),
        Err(StructureError::CompositionMismatch(_))
    ));
}

#[test]
fn test_mismatched_cell_is_rejected() {
    let reference = nacl();
    let coords: Vec<Position> = reference
        .atoms()
        .iter()
        .map(|atom| Position::Fractional(atom.frac_coord()))
        .collect();
    let species = reference.atoms().species();
    let strained =
        Structure::from_positions(Lattice::orthorhombic(11.3, 5.64, 5.64).unwrap(), &species, &coords).unwrap();

    assert!(matches!(
        StructureAligner::default().align(&reference, &strained),
        Err(StructureError::LatticeMismatch)
    ));
}
