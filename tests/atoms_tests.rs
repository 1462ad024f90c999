/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

use approx::assert_relative_eq;
use gvasp_rs::atoms::{
    minimum_image_distance, minimum_image_fractional_diff, search_image, species_table, Atom,
    AtomSet, Lattice, Position, SpeciesTable, Vector3D,
};
use gvasp_rs::utils::matrix::{multiply, IDENTITY};
use rstest::rstest;

/// Deterministic spread of fractional coordinates, including values outside [0, 1)
fn sample_coords() -> Vec<Vector3D> {
    (0..40)
        .map(|i| {
            let t = i as f64;
            Vector3D::new(
                (t * 0.137).sin() * 1.3,
                (t * 0.291).cos() * 0.9 + 0.2,
                (t * 0.053).fract() - 0.4,
            )
        })
        .collect()
}

#[test]
fn test_minimum_image_is_antisymmetric() {
    let coords = sample_coords();
    for a in &coords {
        for b in &coords {
            let ab = minimum_image_fractional_diff(a, b);
            let ba = minimum_image_fractional_diff(b, a);
            assert_relative_eq!(ab.x, -ba.x, epsilon = 1e-12);
            assert_relative_eq!(ab.y, -ba.y, epsilon = 1e-12);
            assert_relative_eq!(ab.z, -ba.z, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_minimum_image_is_bounded() {
    let coords = sample_coords();
    for a in &coords {
        for b in &coords {
            let d = minimum_image_fractional_diff(a, b);
            for component in d.to_array() {
                assert!((-0.5..=0.5).contains(&component), "component {} out of range", component);
            }
        }
    }
}

#[rstest]
#[case([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])]
#[case([[3.9, 0.0, 0.0], [-1.95, 3.377, 0.0], [0.0, 0.0, 12.1]])]
#[case([[4.0, 0.3, 0.1], [0.2, 5.0, -0.4], [0.5, 0.7, 6.0]])]
fn test_lattice_round_trip(#[case] matrix: [[f64; 3]; 3]) {
    let lattice = Lattice::new(matrix).unwrap();

    let product = multiply(lattice.inverse(), lattice.matrix());
    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(product[i][j], IDENTITY[i][j], epsilon = 1e-12);
        }
    }

    for frac in sample_coords() {
        let back = lattice.cart_to_frac(&lattice.frac_to_cart(&frac));
        assert_relative_eq!(back.x, frac.x, epsilon = 1e-10);
        assert_relative_eq!(back.y, frac.y, epsilon = 1e-10);
        assert_relative_eq!(back.z, frac.z, epsilon = 1e-10);
    }
}

#[test]
fn test_diffusion_through_cell_boundary() {
    let lattice = Lattice::cubic(10.0).unwrap();
    let before = Vector3D::new(0.1, 0.0, 0.0);
    let after = Vector3D::new(0.9, 0.0, 0.0);

    let diff = minimum_image_fractional_diff(&before, &after);
    assert_relative_eq!(diff.x, -0.2, epsilon = 1e-12);
    assert_relative_eq!(minimum_image_distance(&lattice, &before, &after), 2.0, epsilon = 1e-12);
    assert_eq!(search_image(&before, &after), [-1, 0, 0]);
}

#[test]
fn test_degenerate_lattice() {
    assert!(Lattice::new([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]).is_err());
    assert!(Lattice::from_lengths_and_angles(1.0, 1.0, 1.0, 90.0, 90.0, 180.0).is_err());
}

#[test]
fn test_atom_set_from_parsed_order() {
    let lattice = Lattice::cubic(5.0).unwrap();
    let atoms: Vec<Atom> = ["Ti", "O", "O"]
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let position = Position::Fractional(Vector3D::new(0.3 * i as f64, 0.0, 0.0));
            Atom::new(s, i, position, &lattice).unwrap()
        })
        .collect();
    let set = AtomSet::new(atoms).unwrap();

    assert_eq!(set.elements(), vec![("Ti".to_string(), 1), ("O".to_string(), 2)]);
    assert_relative_eq!(set.cart_coords()[2].x, 3.0, epsilon = 1e-12);
    assert_relative_eq!(set.frac_coords()[2].x, 0.6, epsilon = 1e-12);
}

#[test]
fn test_builtin_species_table() {
    let table = species_table();
    assert!(table.contains("Ce"));
    assert_relative_eq!(table.reference_bond_length("O", "H").unwrap(), 0.97, epsilon = 1e-12);

    let custom = SpeciesTable::from_json(r#"{ "species": { "O": { "atomic_number": 8, "bonds": { "H": 1.0 } } } }"#)
        .unwrap();
    assert_eq!(custom.reference_bond_length("H", "O"), Some(1.0));
    assert_eq!(custom.reference_bond_length("O", "O"), None);
}
