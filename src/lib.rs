//! # Handheld
//!
//! A three-instruction machine (`acc`, `jmp`, `nop`) with loop detection and
//! single-instruction repair.
//!
//! - [`lang`]: instructions, programs and the override layer.
//! - [`frontend`]: line parser for program text.
//! - [`runtime`]: interpreter, loop detectors and the repair search.
//! - [`bytecode`]: binary program images and the disassembler.

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod runtime;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::bytecode::image::{self, ImageError};
use crate::frontend::LoadError;
use crate::lang::Program;
use crate::runtime::RuntimeError;

/// Any failure surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Load a program from `path`, decoding compiled images and parsing
/// anything else as program text.
pub fn load_program(path: &Path) -> Result<Program> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if image::is_image(&bytes) {
        tracing::debug!(path = %path.display(), "decoding compiled image");
        return Ok(image::decode(&bytes)?);
    }

    let source = String::from_utf8(bytes).map_err(|source| LoadError::InvalidUtf8 {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Program::parse(&source)?)
}
