/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Structure file collaborators
//!
//! Readers produce a [`Structure`](crate::structure::Structure) from POSCAR /
//! CONTCAR or CASTEP `.cell` text; writers emit POSCARs (atom order is always
//! preserved), NEB image directories and MODECAR files.

pub mod cell;
pub mod errors;
pub mod modecar;
pub mod neb;
pub mod poscar;

pub use cell::{parse_cell, read_cell};
pub use errors::{FileError, Result};
pub use modecar::{format_modecar, write_modecar};
pub use neb::{image_dir_name, write_path};
pub use poscar::{format_poscar, parse_poscar, read_poscar, write_poscar};

use crate::structure::{Alignment, Structure};
use log::info;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Read a structure, choosing the format from the file extension
/// (`.cell` for CASTEP, anything else as POSCAR)
pub fn read_structure<P: AsRef<Path>>(path: P) -> Result<Structure> {
    let path = path.as_ref();
    let is_cell = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cell"));
    if is_cell {
        read_cell(path)
    } else {
        read_poscar(path)
    }
}

/// `<path>_sort`, the output name for a reordered structure
pub fn sorted_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut name = OsString::from(path.as_ref().as_os_str());
    name.push("_sort");
    PathBuf::from(name)
}

/// Write both halves of an alignment next to their source files as
/// `<first>_sort` and `<second>_sort`
pub fn write_sorted<P: AsRef<Path>, Q: AsRef<Path>>(
    alignment: &Alignment,
    first: P,
    second: Q,
) -> Result<(PathBuf, PathBuf)> {
    let first = sorted_path(first);
    let second = sorted_path(second);
    write_poscar(&first, &alignment.reference, None)?;
    write_poscar(&second, &alignment.aligned, None)?;
    info!("New structures written to *_sort files");
    Ok((first, second))
}
