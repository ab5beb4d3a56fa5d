//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Error kinds raised while configuring and emitting build rules."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmitError>;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("could not detect the {name} compiler")]
    CompilerNotFound { name: String },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EmitError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        EmitError::Configuration(message.into())
    }
}
