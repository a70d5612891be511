//! Key specifications and their parser.

mod key_spec;
mod parser;

pub use key_spec::{DEFAULT_SEPARATOR, KeySpec};
pub use parser::KeySpecParser;
