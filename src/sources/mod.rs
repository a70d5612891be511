//! Configuration source implementations.

mod config_source;
mod env;
mod file;
mod inline;
mod source_spec;

pub use config_source::{ConfigMap, ConfigSource};
pub use env::{DEFAULT_ENV_PREFIX, EnvSource};
pub use file::FileSource;
pub use inline::{DefaultsSource, InlineSource};
pub use source_spec::SourceSpec;
