//! ---
//! rules_section: "04-command-line"
//! rules_subsection: "binary"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Control CLI printing emitted build rules."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use protoc_rules_core::{locate, SearchPath};
use protoc_rules_logging::{log_event, EventOutcome};

#[derive(Debug, Args)]
pub struct DetectCommand {
    /// Explicit compiler path; printed unchanged when given.
    #[arg(long = "compiler", value_name = "FILE", env = "PROTOC")]
    compiler: Option<PathBuf>,
}

impl DetectCommand {
    pub fn execute(self) -> Result<()> {
        protoc_rules_logging::init();
        let located = locate(self.compiler.as_deref(), &SearchPath::from_env());
        match &located {
            Ok(path) => log_event(
                None,
                "toolchain.detect",
                &format!("compiler at {}", path.display()),
                EventOutcome::Success,
            ),
            Err(err) => log_event(None, "toolchain.detect", &err.to_string(), EventOutcome::Fault),
        }
        let path = located.context("toolchain detection failed")?;
        println!("{}", path.display());
        Ok(())
    }
}
