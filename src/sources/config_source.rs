//! Configuration source trait.

use crate::error::Result;
use serde_json::{Map, Value};

/// A flat, order-preserving configuration mapping.
pub type ConfigMap = Map<String, Value>;

/// Trait for configuration sources.
///
/// Implement this trait to feed options from somewhere other than the
/// built-in file, inline, and environment sources.
pub trait ConfigSource: Send + Sync {
    /// Load configuration as a flat option mapping.
    ///
    /// The returned map is shallow-merged with other sources according to
    /// precedence rules: a top-level key replaces the previous value whole.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or parsed.
    fn load(&self) -> Result<ConfigMap>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Get the priority of this source (higher = takes precedence).
    ///
    /// Default priorities:
    /// - Schema defaults: 0
    /// - Environment variables: 100
    /// - Caller sources: 200, 210, 220, ... in the order given
    fn priority(&self) -> i32 {
        200
    }
}
