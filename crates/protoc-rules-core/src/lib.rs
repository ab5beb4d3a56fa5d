//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Build-rule emitter for the protoc schema compiler."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
//! Build-rule emitter for the protoc schema compiler.
//!
//! Given the source schema files of a rule and its option table, the emitter
//! computes ahead of execution the exact artifacts the compiler will write and
//! the full command that writes them. Everything here is pure path and string
//! computation: no schema is read and no process is started.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use protoc_rules_core::{BuildRule, Emitter, OptionSet, SearchPath, Toolchain};
//!
//! let toolchain = Toolchain::configure(OptionSet::default(), &SearchPath::from_env())?;
//! let emitter = Emitter::new(Arc::new(toolchain));
//! let rule = BuildRule::new("api", ["proto/api.proto"]).with_options(OptionSet {
//!     native_out: Some("gen".into()),
//!     ..Default::default()
//! });
//! let result = emitter.emit(&rule)?;
//! println!("{}", result.invocation.command_line());
//! # Ok::<(), protoc_rules_core::EmitError>(())
//! ```

pub mod emitter;
pub mod errors;
pub mod flags;
pub mod locate;
pub mod mode;
pub mod options;
pub mod paths;
pub mod resolve;
pub mod targets;

pub use emitter::{BuildRule, CompilerInvocation, EmissionResult, Emitter, Toolchain};
pub use errors::{EmitError, Result};
pub use flags::assemble_flags;
pub use locate::{locate, ExecutableSearch, SearchPath, COMPILER_NAME};
pub use mode::{OutputKind, OutputMode};
pub use options::{CustomModeSpec, FlagList, OneOrMany, OptionSet, PathList};
pub use paths::{normalize, IncludePaths};
pub use resolve::{resolve, ResolvedConfiguration};
pub use targets::{derive_targets, stem};
