/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! NEB working-directory layout: `00/POSCAR`, `01/POSCAR`, ...

use super::errors::Result;
use super::poscar::write_poscar;
use crate::structure::Structure;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name of image `index`
pub fn image_dir_name(index: usize) -> String {
    format!("{:02}", index)
}

/// Write every structure of `path` into its own numbered directory under
/// `root`, returning the POSCAR paths in path order
pub fn write_path<P: AsRef<Path>>(root: P, path: &[Structure]) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut written = Vec::with_capacity(path.len());

    for (index, structure) in path.iter().enumerate() {
        let dir = root.join(image_dir_name(index));
        fs::create_dir_all(&dir)?;
        let file = dir.join("POSCAR");
        write_poscar(&file, structure, None)?;
        written.push(file);
    }

    info!("Wrote {} images to {}", path.len(), root.display());
    Ok(written)
}
