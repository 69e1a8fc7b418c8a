pub mod load_error;
pub mod parser;

pub use load_error::LoadError;
pub use parser::Parser;
