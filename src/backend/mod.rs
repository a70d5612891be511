//! Backend collaborator: the Kheops classification service.
//!
//! Only one operation is consumed: resolve a list of fully-qualified keys
//! against a scope. Everything behind it (hierarchy, merge rules, storage)
//! is the backend's business.

mod memory;

pub use memory::{RecordedRequest, StaticBackend};

use crate::core::LogLevel;
use crate::sources::ConfigMap;

/// Opaque backend failure. The resolver never inspects or retries these.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be opened.
    #[error("Failed to start Kheops backend: {0}")]
    Init(String),

    /// A lookup failed.
    #[error("Kheops lookup failed: {0}")]
    Lookup(String),

    /// Any other error raised by a backend implementation.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A key-value classification backend.
pub trait Backend {
    /// Resolve `keys` for `scope`.
    ///
    /// Returns a mapping from fully-qualified key to value. Keys the backend
    /// cannot resolve are simply absent.
    fn lookup(
        &self,
        keys: &[String],
        scope: &ConfigMap,
        explain: bool,
    ) -> Result<ConfigMap, BackendError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn lookup(
        &self,
        keys: &[String],
        scope: &ConfigMap,
        explain: bool,
    ) -> Result<ConfigMap, BackendError> {
        (**self).lookup(keys, scope, explain)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn lookup(
        &self,
        keys: &[String],
        scope: &ConfigMap,
        explain: bool,
    ) -> Result<ConfigMap, BackendError> {
        (**self).lookup(keys, scope, explain)
    }
}

/// What a backend factory needs to open an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSettings {
    /// Path to the backend's own configuration.
    pub config_path: Option<String>,
    /// Namespace the instance is opened with.
    pub namespace: Option<String>,
    /// Log level the instance should emit at.
    pub log_level: LogLevel,
    /// Default explain flag.
    pub explain: bool,
}
