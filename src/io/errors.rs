/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! Error types for structure file reading and writing

use crate::atoms::AtomError;
use crate::structure::StructureError;
use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing structure files
#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// A line could not be interpreted
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// A required `%BLOCK` section is absent
    #[error("Missing block: {0}")]
    MissingBlock(String),

    #[error(transparent)]
    Atom(#[from] AtomError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl FileError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FileError::ParseError {
            line,
            message: message.into(),
        }
    }
}

/// Result type for file operations
pub type Result<T> = std::result::Result<T, FileError>;
