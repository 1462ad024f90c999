/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Atom representation for periodic structures

use super::database;
use super::errors::{AtomError, Result};
use super::lattice::Lattice;
use super::periodic;
use super::vector::Vector3D;
use std::fmt;

/// How an atomic position was specified
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// Fractional coordinates in units of the lattice vectors
    Fractional(Vector3D),
    /// Cartesian coordinates in Å
    Cartesian(Vector3D),
}

/// Represents one atom of a periodic structure
///
/// Both coordinate forms are resolved against the lattice when the atom is
/// built. The fractional coordinate is always wrapped into `[0, 1)`. A
/// Cartesian input is kept verbatim (it may lie outside the home cell), a
/// fractional input derives its Cartesian form from the wrapped value.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Canonical element symbol
    species: String,
    /// Atomic number (Z) of the element
    atomic_number: i32,
    /// Index of the atom within its atom set
    order: usize,
    /// Wrapped fractional coordinate
    frac_coord: Vector3D,
    /// Cartesian coordinate in Å
    cart_coord: Vector3D,
    /// Per-axis move flags (selective dynamics), `None` when not specified
    selective: Option<[bool; 3]>,
    /// Spin (magnetic moment guess), 0.0 for non-magnetic
    spin: f64,
}

impl Atom {
    /// Create a new atom of `species` at `position` in `lattice`
    pub fn new(species: &str, order: usize, position: Position, lattice: &Lattice) -> Result<Self> {
        let atomic_number = database::atomic_number_from_symbol(species)
            .ok_or_else(|| AtomError::UnknownSpecies(species.to_string()))?;
        let species = database::element_symbol(atomic_number)
            .ok_or_else(|| AtomError::UnknownSpecies(species.to_string()))?
            .to_string();

        let (frac_coord, cart_coord) = resolve(position, lattice)?;

        Ok(Self {
            species,
            atomic_number,
            order,
            frac_coord,
            cart_coord,
            selective: None,
            spin: 0.0,
        })
    }

    /// Attach selective-dynamics flags (true = allowed to move)
    pub fn with_selective(mut self, selective: [bool; 3]) -> Self {
        self.selective = Some(selective);
        self
    }

    /// Attach a spin value
    pub fn with_spin(mut self, spin: f64) -> Self {
        self.spin = spin;
        self
    }

    /// Copy of this atom moved to a new position; species, order, flags and
    /// spin are kept
    pub fn displaced(&self, position: Position, lattice: &Lattice) -> Result<Self> {
        let (frac_coord, cart_coord) = resolve(position, lattice)?;
        Ok(Self {
            frac_coord,
            cart_coord,
            ..self.clone()
        })
    }

    /// Get the element symbol
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Get the atomic number
    pub fn atomic_number(&self) -> i32 {
        self.atomic_number
    }

    /// Index of the atom within its atom set
    pub fn order(&self) -> usize {
        self.order
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    /// Wrapped fractional coordinate, each component in `[0, 1)`
    pub fn frac_coord(&self) -> Vector3D {
        self.frac_coord
    }

    /// Cartesian coordinate in Å
    pub fn cart_coord(&self) -> Vector3D {
        self.cart_coord
    }

    /// Selective-dynamics flags, if any
    pub fn selective(&self) -> Option<[bool; 3]> {
        self.selective
    }

    /// Get the spin value
    pub fn spin(&self) -> f64 {
        self.spin
    }

    /// Label such as `O2c`: species followed by a coordination number
    pub fn atom_type(&self, coordination_number: usize) -> String {
        format!("{}{}c", self.species, coordination_number)
    }

    /// Image vector placing `other` closest to this atom
    pub fn search_image(&self, other: &Self) -> [i32; 3] {
        periodic::search_image(&self.frac_coord, &other.frac_coord)
    }

    /// Minimum-image distance to another atom of the same structure
    pub fn distance_to(&self, other: &Self, lattice: &Lattice) -> f64 {
        periodic::minimum_image_distance(lattice, &self.frac_coord, &other.frac_coord)
    }
}

fn resolve(position: Position, lattice: &Lattice) -> Result<(Vector3D, Vector3D)> {
    let raw = match position {
        Position::Fractional(v) | Position::Cartesian(v) => v,
    };
    if !(raw.x.is_finite() && raw.y.is_finite() && raw.z.is_finite()) {
        return Err(AtomError::InvalidCoordinates(format!(
            "non-finite coordinate {}",
            raw
        )));
    }

    Ok(match position {
        Position::Fractional(frac) => {
            let frac = periodic::wrap_fractional(&frac);
            (frac, lattice.frac_to_cart(&frac))
        }
        Position::Cartesian(cart) => (periodic::wrap_fractional(&lattice.cart_to_frac(&cart)), cart),
    })
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Atom {} : {} : {})", self.order, self.species, self.cart_coord)
    }
}
