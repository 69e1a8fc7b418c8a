pub mod disasm;
pub mod image;

pub use image::{Image, ImageError};
