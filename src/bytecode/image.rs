use crate::lang::Program;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File prefix identifying a compiled handheld program.
pub const MAGIC: [u8; 4] = *b"HHBC";

/// Current image format version.
pub const VERSION: u16 = 1;

/// Conventional extension for compiled programs.
pub const EXTENSION: &str = "hhbc";

/// A parsed program ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub version: u16,
    pub program: Program,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("not a handheld image (bad magic)")]
    BadMagic,

    #[error("unsupported image version {found} (expected {})", VERSION)]
    UnsupportedVersion { found: u16 },

    #[error("corrupt image: {0}")]
    Codec(#[from] postcard::Error),
}

/// Serialize `program` as `MAGIC` followed by a postcard-encoded [`Image`].
pub fn encode(program: &Program) -> Result<Vec<u8>, ImageError> {
    let image = Image {
        version: VERSION,
        program: program.clone(),
    };

    let body = postcard::to_allocvec(&image)?;
    let mut bytes = Vec::with_capacity(MAGIC.len() + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<Program, ImageError> {
    let body = bytes.strip_prefix(&MAGIC).ok_or(ImageError::BadMagic)?;
    let image: Image = postcard::from_bytes(body)?;

    if image.version != VERSION {
        return Err(ImageError::UnsupportedVersion {
            found: image.version,
        });
    }
    Ok(image.program)
}

pub fn is_image(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}
