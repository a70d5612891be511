//! # kheops-resolver
//!
//! Variable resolution glue between an inventory/configuration host and a
//! Kheops classification backend.
//!
//! ## Overview
//!
//! Given keys to look up and the facts describing a host, `kheops-resolver`:
//! - Layers configuration (schema defaults → `ANSIBLE_KHEOPS_*` env vars → files and inline mappings)
//! - Parses key specs (`"namespace/key/remap"`, lists, mappings) into normalized keys
//! - Builds the query scope from host variables, directly or through a template engine
//! - Queries the backend, renames remapped keys and optionally templates the results
//!
//! ## Quick Start
//!
//! ```rust
//! use kheops_resolver::prelude::*;
//! use serde_json::json;
//!
//! # fn example() -> Result<()> {
//! let backend = StaticBackend::new().with_value("default/role", "web");
//! let kheops = KheopsLookup::builder()
//!     .without_env()
//!     .with_inline(json!({
//!         "process_scope": "vars",
//!         "scope": {"node": "inventory_hostname"},
//!     }))
//!     .build(backend)?;
//!
//! let host_vars = json!({"inventory_hostname": "host1"});
//! let host_vars = host_vars.as_object().unwrap();
//! let result = kheops.super_lookup(
//!     &LookupRequest::new().with_keys("default/role/server_role"),
//!     &LookupContext::new(host_vars),
//! )?;
//! assert_eq!(result["server_role"], "web");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! The backend, the variable source and the template engine are all
//! injected: see [`backend::Backend`], [`scope::VariableSource`] and
//! [`template::TemplateEngine`].

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod backend;
pub mod core;
pub mod error;
pub mod keys;
pub mod scope;
pub mod sources;
pub mod template;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::backend::{Backend, BackendError, InstanceSettings, StaticBackend};
    pub use crate::core::{
        KheopsLookup, KheopsLookupBuilder, LookupContext, LookupRequest, ResultsStrategy,
        ScopeErrorPolicy, ScopeStrategy, Settings,
    };
    pub use crate::error::{KheopsError, Result};
    pub use crate::keys::{KeySpec, KeySpecParser};
    pub use crate::scope::{NoVariables, ScopeBuilder, VariableSource};
    pub use crate::sources::{ConfigMap, SourceSpec};
    pub use crate::template::{PathTemplateEngine, TemplateEngine};
}
