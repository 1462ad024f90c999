/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Species properties and the process-wide reference bond-length table
//!
//! Bond classification asks one question: what is the reference single-bond
//! length between species A and species B? The answer comes from a
//! [`SpeciesTable`] that is built once per process and is read-only after
//! that. By default the table is derived from the covalent radii in
//! [`database`](super::database) (reference length = r_A + r_B). A custom
//! table can be loaded from JSON and installed at startup with
//! [`install_table`]; pairs it does not list are never bonded.
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "species": {
//!     "O":  { "atomic_number": 8,  "bonds": { "H": 0.97, "Ce": 2.45 } },
//!     "Ce": { "atomic_number": 58, "bonds": { "O": 2.45 } }
//!   },
//!   "fallback_to_covalent_radii": false
//! }
//! ```

use super::database;
use super::errors::{AtomError, Result};
use log::debug;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Static properties of one chemical species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProperties {
    /// Atomic number (Z)
    pub atomic_number: i32,
    /// Covalent radius in Å, used when the table falls back to radii
    #[serde(default)]
    pub covalent_radius: Option<f64>,
    /// Explicit reference bond lengths to other species, keyed by symbol
    #[serde(default)]
    pub bonds: HashMap<String, f64>,
}

impl SpeciesProperties {
    /// Properties for an element taken from the built-in database
    pub fn from_database(symbol: &str) -> Option<Self> {
        let atomic_number = database::atomic_number_from_symbol(symbol)?;
        Some(Self {
            atomic_number,
            covalent_radius: database::covalent_radius(atomic_number),
            bonds: HashMap::new(),
        })
    }
}

/// Immutable lookup from species label to [`SpeciesProperties`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTable {
    /// Per-species entries keyed by symbol
    #[serde(default)]
    pub species: HashMap<String, SpeciesProperties>,
    /// When no explicit bond is listed, use the sum of covalent radii
    #[serde(default)]
    pub fallback_to_covalent_radii: bool,
}

impl SpeciesTable {
    /// Table covering every element, bonds derived from covalent radii
    pub fn builtin() -> Self {
        let species = (1..=118)
            .filter_map(database::element_symbol)
            .filter_map(|symbol| {
                SpeciesProperties::from_database(symbol).map(|props| (symbol.to_string(), props))
            })
            .collect();

        Self {
            species,
            fallback_to_covalent_radii: true,
        }
    }

    /// Parse a table from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading species table from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn validate(&self) -> Result<()> {
        for (symbol, props) in &self.species {
            for (other, length) in &props.bonds {
                if !length.is_finite() || *length <= 0.0 {
                    return Err(AtomError::SpeciesTable(format!(
                        "bond length {}-{} must be positive, got {}",
                        symbol, other, length
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up the properties of a species
    pub fn get(&self, symbol: &str) -> Option<&SpeciesProperties> {
        self.species.get(symbol)
    }

    /// Whether the table knows this species
    pub fn contains(&self, symbol: &str) -> bool {
        self.species.contains_key(symbol)
    }

    /// Reference single-bond length between two species
    ///
    /// `None` means the pair is never considered bonded.
    pub fn reference_bond_length(&self, a: &str, b: &str) -> Option<f64> {
        let props_a = self.species.get(a);
        let props_b = self.species.get(b);

        let explicit = props_a
            .and_then(|p| p.bonds.get(b))
            .or_else(|| props_b.and_then(|p| p.bonds.get(a)));
        if let Some(length) = explicit {
            return Some(*length);
        }

        if self.fallback_to_covalent_radii {
            let radius_a = props_a.and_then(|p| p.covalent_radius)?;
            let radius_b = props_b.and_then(|p| p.covalent_radius)?;
            return Some(radius_a + radius_b);
        }

        None
    }
}

static SPECIES_TABLE: OnceCell<SpeciesTable> = OnceCell::new();

/// Install the process-wide species table
///
/// Must happen before the first call to [`species_table`]; afterwards the
/// table is frozen and this returns an error.
pub fn install_table(table: SpeciesTable) -> Result<()> {
    SPECIES_TABLE.set(table).map_err(|_| {
        AtomError::SpeciesTable("species table is already initialised".to_string())
    })
}

/// The process-wide species table, initialised lazily with
/// [`SpeciesTable::builtin`] if nothing was installed
pub fn species_table() -> &'static SpeciesTable {
    SPECIES_TABLE.get_or_init(SpeciesTable::builtin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_table_uses_covalent_radii() {
        let table = SpeciesTable::builtin();
        assert_relative_eq!(table.reference_bond_length("O", "H").unwrap(), 0.97, epsilon = 1e-12);
        assert_relative_eq!(table.reference_bond_length("Cu", "Cu").unwrap(), 2.64, epsilon = 1e-12);
        assert!(table.reference_bond_length("O", "Xx").is_none());
        assert_eq!(table.get("Fe").unwrap().atomic_number, 26);
    }

    #[test]
    fn test_json_table_only_knows_listed_pairs() {
        let json = r#"{
            "species": {
                "O":  { "atomic_number": 8,  "bonds": { "Ce": 2.45 } },
                "Ce": { "atomic_number": 58 }
            }
        }"#;
        let table = SpeciesTable::from_json(json).unwrap();

        assert_eq!(table.reference_bond_length("O", "Ce"), Some(2.45));
        assert_eq!(table.reference_bond_length("Ce", "O"), Some(2.45));
        assert_eq!(table.reference_bond_length("O", "O"), None);
    }

    #[test]
    fn test_invalid_bond_length_is_rejected() {
        let json = r#"{ "species": { "O": { "atomic_number": 8, "bonds": { "H": -1.0 } } } }"#;
        assert!(matches!(
            SpeciesTable::from_json(json),
            Err(AtomError::SpeciesTable(_))
        ));
    }

    #[test]
    fn test_process_table_is_frozen_after_first_use() {
        let table = species_table();
        assert!(table.contains("Ce"));
        assert!(install_table(SpeciesTable::default()).is_err());
    }
}
