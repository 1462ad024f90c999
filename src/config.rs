/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Runtime settings loaded from a JSON file
//!
//! ```json
//! {
//!   "neighbour": { "neighbour_num": 12, "bond_tolerance": 1.15 },
//!   "align": { "tight_tolerance": 0.3 },
//!   "idpp": { "max_iter": 2000 },
//!   "species_table": "species.json"
//! }
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use crate::atoms::species::{self, SpeciesTable};
use crate::atoms::AtomError;
use crate::path::IdppConfig;
use crate::structure::{AlignConfig, NeighbourConfig};
use crate::utils::constants::OVERLAP_CUTOFF;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid settings: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error(transparent)]
    Species(#[from] AtomError),
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// All tunables of the toolkit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub neighbour: NeighbourConfig,
    pub align: AlignConfig,
    pub idpp: IdppConfig,
    /// Default cutoff for overlap checks (Å)
    pub overlap_cutoff: f64,
    /// JSON species table replacing the built-in covalent radii
    pub species_table: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            neighbour: NeighbourConfig::default(),
            align: AlignConfig::default(),
            idpp: IdppConfig::default(),
            overlap_cutoff: OVERLAP_CUTOFF,
            species_table: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    ///
    /// A relative `species_table` path is resolved against the settings
    /// file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut settings = Self::from_json(&fs::read_to_string(path)?)?;
        if let (Some(table), Some(dir)) = (&settings.species_table, path.parent()) {
            if table.is_relative() {
                settings.species_table = Some(dir.join(table));
            }
        }
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Range checks on the numeric fields
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("neighbour.bond_tolerance", self.neighbour.bond_tolerance),
            ("align.tight_tolerance", self.align.tight_tolerance),
            ("align.loose_tolerance", self.align.loose_tolerance),
            ("idpp.step_size", self.idpp.step_size),
            ("idpp.max_disp", self.idpp.max_disp),
            ("overlap_cutoff", self.overlap_cutoff),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("must be positive, got {}", value),
                });
            }
        }
        if self.neighbour.neighbour_num == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "neighbour.neighbour_num",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Install the configured species table as the process-wide table
    ///
    /// Does nothing when no table is configured. Must run before any
    /// neighbour table is built.
    pub fn install_species_table(&self) -> Result<()> {
        if let Some(path) = &self.species_table {
            species::install_table(SpeciesTable::from_file(path)?)?;
            info!("Installed species table from {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings = Settings::from_json(r#"{ "idpp": { "max_iter": 5 } }"#).unwrap();
        assert_eq!(settings.idpp.max_iter, 5);
        assert_eq!(settings.idpp.spring_const, 5.0);
        assert_eq!(settings.align, AlignConfig::default());
        assert_eq!(settings.neighbour.neighbour_num, Some(12));
        assert_eq!(settings.species_table, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = Settings::from_json(r#"{ "neighbour": { "bond_tolerance": -1.0 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "neighbour.bond_tolerance", .. })
        ));
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_file_resolves_species_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "species_table": "species.json", "overlap_cutoff": 0.5 }}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.overlap_cutoff, 0.5);
        let expected = file.path().parent().unwrap().join("species.json");
        assert_eq!(settings.species_table, Some(expected));
    }

    #[test]
    fn test_round_trip_through_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
