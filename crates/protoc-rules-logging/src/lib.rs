//! ---
//! rules_section: "03-logging"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Structured logging context and lifecycle events."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
#![warn(missing_docs)]

//! Logging side channel for rule emission.
//!
//! Library code only emits `tracing` events; whether and where they are
//! written is decided by the subscriber the caller installs.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber writing to stderr.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Build rule the event belongs to.
    pub rule: Option<&'a str>,
    /// Source schema file being processed.
    pub source: Option<&'a str>,
    /// Output mode being processed.
    pub mode: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a rule name.
    pub fn with_rule(mut self, rule: &'a str) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Attach a source path.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach an output mode.
    pub fn with_mode(mut self, mode: &'a str) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation failed or was aborted.
    Fault,
}

impl EventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            EventOutcome::Success => "success",
            EventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized lifecycle event with a success/fault outcome.
pub fn log_event(context: Option<&LogContext>, event: &str, message: &str, outcome: EventOutcome) {
    let ctx = context.cloned().unwrap_or_default();
    match outcome {
        EventOutcome::Success => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            rule = ctx.rule.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            mode = ctx.mode.unwrap_or(""),
            message = %message
        ),
        EventOutcome::Fault => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            rule = ctx.rule.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            mode = ctx.mode.unwrap_or(""),
            message = %message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new().with_rule("api").with_mode("cpp");
        rules_debug!(context = ctx.clone(), "writing to {}", "/gen");
        rules_debug!("debug message");
        assert_eq!(ctx.mode, Some("cpp"));
    }

    #[test]
    fn init_does_not_panic() {
        init();
        init();
    }

    #[test]
    fn lifecycle_event_helper_emits() {
        init();
        let ctx = LogContext::new().with_rule("api").with_source("api.proto");
        log_event(Some(&ctx), "rule.emit", "targets derived", EventOutcome::Success);
        log_event(None, "toolchain.detect", "compiler missing", EventOutcome::Fault);
    }
}
