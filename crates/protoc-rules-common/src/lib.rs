//! ---
//! rules_section: "01-core-functionality"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Shared configuration and logging setup."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
//! Shared primitives for the protoc-rules workspace.
//! This crate exposes build-file loading and tracing initialisation used by
//! the command-line front-end and integration tests.

pub mod config;
pub mod logging;

pub use config::{BuildFile, LoadedBuildFile, LoggingConfig};
pub use logging::{init_tracing, LogFormat};
