/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Command Line Interface (CLI) module
//!
//! Every subcommand reads structures through [`crate::io`], runs one library
//! operation and writes or prints the result.

use crate::config::Settings;
use crate::io;
use crate::path::{IdppPath, LinearPath};
use crate::structure::{NeighbourConfig, StructureAligner};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gvasp-rs")]
#[command(about = "Periodic structure toolkit for VASP: distances, alignment and NEB paths")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the minimum-image distance between two index-aligned structures
    Dist { first: PathBuf, second: PathBuf },

    /// Reorder two structures into atom-by-atom correspondence and write
    /// `<file>_sort` outputs
    Align { first: PathBuf, second: PathBuf },

    /// Generate NEB images between two endpoint structures
    Neb {
        initial: PathBuf,

        #[arg(value_name = "FINAL")]
        fin: PathBuf,

        /// Number of interior images
        #[arg(short = 'n', long, default_value_t = 4)]
        images: usize,

        /// Interpolation method
        #[arg(short, long, value_enum, default_value_t = Method::Idpp)]
        method: Method,

        /// Directory receiving the 00, 01, ... image folders
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Check that no two atoms are closer than a cutoff
    Overlap {
        file: PathBuf,

        /// Minimum allowed distance (Å); defaults to the settings value
        #[arg(long)]
        cutoff: Option<f64>,
    },

    /// Write the normalised displacement between two structures as a MODECAR
    Modecar {
        first: PathBuf,
        second: PathBuf,

        #[arg(short, long, default_value = "MODECAR")]
        output: PathBuf,
    },

    /// Print lattice parameters and coordination types of a structure
    Info { file: PathBuf },
}

/// Path interpolation method
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Linear,
    Idpp,
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.install_species_table()?;

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to set thread pool size")?;
        info!("Using {} threads", threads);
    }

    match cli.command {
        Commands::Dist { first, second } => {
            let (a, b) = (read(&first)?, read(&second)?);
            println!("{:.6}", a.dist(&b)?);
        }
        Commands::Align { first, second } => {
            let (a, b) = (read(&first)?, read(&second)?);
            let alignment = StructureAligner::new(settings.align.clone()).align(&a, &b)?;
            let (out_a, out_b) = io::write_sorted(&alignment, &first, &second)?;
            println!("{}\n{}", out_a.display(), out_b.display());
        }
        Commands::Neb {
            initial,
            fin,
            images,
            method,
            output,
        } => {
            let (start, end) = (read(&initial)?, read(&fin)?);
            let path = match method {
                Method::Linear => LinearPath::new(&start, &end, images)?.into_images(),
                Method::Idpp => {
                    let result = IdppPath::from_linear(&start, &end, images)?.run(&settings.idpp)?;
                    if !result.converged() {
                        warn!("Writing unconverged IDPP path after {} steps", result.iterations);
                    }
                    result.path
                }
            };
            for (index, image) in path.iter().enumerate() {
                image
                    .check_overlap(settings.overlap_cutoff)
                    .with_context(|| format!("Image {} overlaps", io::image_dir_name(index)))?;
            }
            io::write_path(&output, &path)?;
        }
        Commands::Overlap { file, cutoff } => {
            let structure = read(&file)?;
            structure.check_overlap(cutoff.unwrap_or(settings.overlap_cutoff))?;
            println!("No structure overlap");
        }
        Commands::Modecar {
            first,
            second,
            output,
        } => {
            let (a, b) = (read(&first)?, read(&second)?);
            if !a.matches(&b) {
                anyhow::bail!(
                    "{} and {} do not match; align them first",
                    first.display(),
                    second.display()
                );
            }
            io::write_modecar(&output, &a, &b)?;
            info!("MODECAR written to {}", output.display());
        }
        Commands::Info { file } => {
            let structure = read(&file)?;
            print_info(&structure, &settings.neighbour);
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<crate::structure::Structure> {
    io::read_structure(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_info(structure: &crate::structure::Structure, config: &NeighbourConfig) {
    let lattice = structure.lattice();
    let [a, b, c] = lattice.length();
    let [alpha, beta, gamma] = lattice.angle();
    println!("a = {:.6}  b = {:.6}  c = {:.6}", a, b, c);
    println!("alpha = {:.4}  beta = {:.4}  gamma = {:.4}", alpha, beta, gamma);
    println!("volume = {:.6}", lattice.volume());

    let formula: Vec<String> = structure
        .atoms()
        .size()
        .into_iter()
        .map(|(species, count)| format!("{}{}", species, count))
        .collect();
    println!("formula = {}", formula.join(" "));

    let table = structure.neighbour_table(config);
    for (atom, label) in structure.atoms().iter().zip(table.atom_types(structure.atoms())) {
        println!("{:>5} {:<3} {}", atom.order(), atom.species(), label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_neb() {
        let cli = Cli::try_parse_from([
            "gvasp-rs", "neb", "ini/POSCAR", "fin/POSCAR", "-n", "6", "--method", "linear", "-o", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Neb {
                images,
                method,
                output,
                ..
            } => {
                assert_eq!(images, 6);
                assert_eq!(method, Method::Linear);
                assert_eq!(output, PathBuf::from("out"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_neb_rejects_overlapping_endpoint() {
        let dir = tempfile::TempDir::new().unwrap();
        let crowded = "crowded\n1.0\n10 0 0\n0 10 0\n0 0 10\nO\n2\nDirect\n0.1 0.1 0.1\n0.102 0.1 0.1\n";
        let spread = "spread\n1.0\n10 0 0\n0 10 0\n0 0 10\nO\n2\nDirect\n0.1 0.1 0.1\n0.3 0.1 0.1\n";
        let (ini, fin) = (dir.path().join("ini"), dir.path().join("fin"));
        std::fs::write(&ini, crowded).unwrap();
        std::fs::write(&fin, spread).unwrap();
        let out = dir.path().join("neb");

        let args: Vec<OsString> = vec![
            "gvasp-rs".into(),
            "neb".into(),
            ini.into_os_string(),
            fin.into_os_string(),
            "-n".into(),
            "2".into(),
            "--method".into(),
            "linear".into(),
            "-o".into(),
            out.clone().into_os_string(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let err = run(cli).unwrap_err();
        assert!(err.to_string().contains("Image 00"));
        assert!(!out.join("00").exists());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["gvasp-rs", "overlap", "POSCAR", "--cutoff", "0.2", "--config", "s.json"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("s.json")));
        assert!(matches!(cli.command, Commands::Overlap { cutoff: Some(c), .. } if c == 0.2));
    }
}
