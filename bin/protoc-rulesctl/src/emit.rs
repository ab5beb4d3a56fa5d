//! ---
//! rules_section: "04-command-line"
//! rules_subsection: "binary"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Control CLI printing emitted build rules."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use protoc_rules_common::config::DEFAULT_BUILD_FILE;
use protoc_rules_common::{init_tracing, BuildFile};
use protoc_rules_core::{BuildRule, EmissionResult, Emitter, SearchPath, Toolchain};
use protoc_rules_logging::{log_event, EventOutcome, LogContext};
use serde::Serialize;

#[derive(Debug, Args)]
pub struct EmitCommand {
    /// Build file to read (defaults to PROTOC_RULES_CONFIG or ./protoc-rules.toml).
    #[arg(long = "build-file", value_name = "FILE")]
    build_file: Option<PathBuf>,

    /// Only emit the named rule; may be repeated.
    #[arg(long = "rule", value_name = "NAME")]
    rules: Vec<String>,

    /// Override the compiler path from the build file defaults.
    #[arg(long = "compiler", value_name = "FILE", env = "PROTOC")]
    compiler: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct RuleReport<'a> {
    rule: &'a str,
    #[serde(flatten)]
    result: &'a EmissionResult,
}

impl EmitCommand {
    pub fn execute(self) -> Result<()> {
        let build_file = match &self.build_file {
            Some(path) => BuildFile::from_path(path)?,
            None => BuildFile::load(&[DEFAULT_BUILD_FILE])?,
        };
        init_tracing("protoc-rulesctl", &build_file.logging)?;

        let mut defaults = build_file.defaults.clone();
        if let Some(compiler) = self.compiler.clone() {
            defaults.compiler_path = Some(compiler);
        }
        let toolchain = Toolchain::configure(defaults, &SearchPath::from_env())
            .context("unable to configure the protoc toolchain")?;
        let emitter = Emitter::new(Arc::new(toolchain));

        let selected = self.select(&build_file)?;
        let mut emitted = Vec::with_capacity(selected.len());
        for rule in selected {
            let context = LogContext::new().with_rule(&rule.name);
            match emitter.emit(rule) {
                Ok(result) => {
                    log_event(
                        Some(&context),
                        "rule.emit",
                        &format!("{} targets", result.targets.len()),
                        EventOutcome::Success,
                    );
                    emitted.push((rule.name.as_str(), result));
                }
                Err(err) => {
                    log_event(Some(&context), "rule.emit", &err.to_string(), EventOutcome::Fault);
                    return Err(err).with_context(|| format!("failed to emit rule '{}'", rule.name));
                }
            }
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self.format {
            OutputFormat::Json => {
                let reports: Vec<_> = emitted
                    .iter()
                    .map(|(rule, result)| RuleReport { rule, result })
                    .collect();
                serde_json::to_writer_pretty(&mut out, &reports)?;
                writeln!(out)?;
            }
            OutputFormat::Text => {
                for (rule, result) in &emitted {
                    write_text(&mut out, rule, result)?;
                }
            }
        }
        Ok(())
    }

    fn select<'a>(&self, build_file: &'a BuildFile) -> Result<Vec<&'a BuildRule>> {
        if self.rules.is_empty() {
            return Ok(build_file.rules.values().collect());
        }
        self.rules
            .iter()
            .map(|name| {
                build_file
                    .rule(name)
                    .ok_or_else(|| anyhow!("rule '{}' is not declared in the build file", name))
            })
            .collect()
    }
}

fn write_text(out: &mut impl Write, rule: &str, result: &EmissionResult) -> io::Result<()> {
    writeln!(out, "[{}]", rule)?;
    writeln!(out, "targets:")?;
    for target in &result.targets {
        writeln!(out, "  {}", target.display())?;
    }
    writeln!(out, "command: {}", result.invocation.command_line())?;
    if let Some(description) = &result.description {
        writeln!(out, "description: {}", description)?;
    }
    Ok(())
}
