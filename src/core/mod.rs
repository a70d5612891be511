//! Core configuration resolution and query orchestration.

mod builder;
mod loader;
mod lookup;
pub mod schema;
mod settings;

pub use builder::KheopsLookupBuilder;
pub use loader::ConfigResolver;
pub use lookup::{KheopsLookup, LookupContext, LookupRequest};
pub use settings::{LogLevel, Mode, ResultsStrategy, ScopeErrorPolicy, ScopeStrategy, Settings};
