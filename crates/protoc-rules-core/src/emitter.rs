//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Entry point computing targets and invocations for build rules."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use protoc_rules_logging::{rules_debug, LogContext};
use serde::Serialize;

use crate::errors::Result;
use crate::flags::assemble_flags;
use crate::locate::{locate, ExecutableSearch};
use crate::options::OptionSet;
use crate::paths::{normalize, IncludePaths};
use crate::resolve::resolve;
use crate::targets::derive_targets;

/// Process-wide defaults, established once per build configuration.
///
/// Holds the defaults table with the compiler path and base directory
/// filled in. It is never modified after [`Toolchain::configure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    defaults: OptionSet,
}

impl Toolchain {
    /// Locate the compiler and pin the base directory.
    ///
    /// A missing base directory is taken from the process working directory.
    /// Fails with [`crate::EmitError::CompilerNotFound`] when no compiler can
    /// be resolved.
    pub fn configure(mut defaults: OptionSet, search: &dyn ExecutableSearch) -> Result<Self> {
        let compiler = locate(defaults.compiler_path.as_deref(), search)?;
        defaults.compiler_path = Some(compiler);

        let base_dir = match defaults.base_dir.take().filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => normalize(&dir, &env::current_dir()?),
            None => env::current_dir()?,
        };
        defaults.base_dir = Some(base_dir);

        Ok(Self { defaults })
    }

    /// Whether a compiler can be resolved from `defaults` and `search`.
    pub fn exists(defaults: &OptionSet, search: &dyn ExecutableSearch) -> bool {
        locate(defaults.compiler_path.as_deref(), search).is_ok()
    }

    pub fn defaults(&self) -> &OptionSet {
        &self.defaults
    }

    pub fn compiler(&self) -> &Path {
        self.defaults
            .compiler_path
            .as_deref()
            .unwrap_or_else(|| Path::new(crate::locate::COMPILER_NAME))
    }

    pub fn base_dir(&self) -> &Path {
        self.defaults.base_dir.as_deref().unwrap_or_else(|| Path::new("/"))
    }
}

/// One unit of work handed over by the build engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRule {
    pub name: String,
    pub sources: Vec<PathBuf>,
    pub options: OptionSet,
}

impl BuildRule {
    pub fn new<I, P>(name: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            name: name.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            options: OptionSet::default(),
        }
    }

    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }
}

/// Compiler command for one rule: `EXECUTABLE FLAGS... SOURCES...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerInvocation {
    pub executable: PathBuf,
    pub flags: Vec<String>,
    /// Sources as given to the rule.
    pub sources: Vec<PathBuf>,
    /// Directory relative sources are interpreted against.
    pub working_dir: PathBuf,
}

impl CompilerInvocation {
    /// Arguments after the executable, sources rendered as absolute paths.
    pub fn args(&self) -> Vec<String> {
        self.flags
            .iter()
            .cloned()
            .chain(self.absolute_sources().map(|source| source.display().to_string()))
            .collect()
    }

    pub fn absolute_sources(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.sources
            .iter()
            .map(|source| normalize(source, &self.working_dir))
    }

    /// Shell-style rendering of the full command.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.display().to_string())
            .chain(self.args())
            .map(|arg| quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Characters that never need quoting in a POSIX shell word.
fn is_shell_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch, '-' | '_' | '.' | '/' | '=' | ':' | ',' | '+' | '@' | '%')
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty() && arg.chars().all(is_shell_safe);
    if plain {
        arg.to_owned()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Outcome of emitting one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmissionResult {
    /// Artifacts the invocation produces, in deterministic order.
    pub targets: Vec<PathBuf>,
    /// Sources, unchanged from the rule.
    pub sources: Vec<PathBuf>,
    pub invocation: CompilerInvocation,
    /// Human-readable action text, when a display template is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EmissionResult {
    /// Text shown for the action: the rendered description or the command.
    pub fn display(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.invocation.command_line())
    }
}

/// Computes targets and invocations for build rules.
///
/// Cheap to clone and safe to share between threads; every call works on its
/// own values and reads the toolchain defaults without modifying them.
#[derive(Debug, Clone)]
pub struct Emitter {
    toolchain: Arc<Toolchain>,
}

impl Emitter {
    pub fn new(toolchain: Arc<Toolchain>) -> Self {
        Self { toolchain }
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn emit(&self, rule: &BuildRule) -> Result<EmissionResult> {
        let config = resolve(&rule.options, self.toolchain.defaults())?;
        let targets = derive_targets(&rule.sources, &config);
        let include_paths = IncludePaths::for_rule(
            &config.base_dir,
            config.include_paths.iter().map(PathBuf::as_path),
            rule.sources.iter().map(PathBuf::as_path),
        );
        let flags = assemble_flags(&config, &include_paths);

        let context = LogContext::new().with_rule(&rule.name);
        for mode in config.enabled_modes() {
            if let Some(dir) = config.out_dir(mode) {
                rules_debug!(
                    context = context.clone().with_mode(mode.kind.generator()),
                    "writing {} to {}",
                    mode.suffixes.join(", "),
                    dir.display()
                );
            }
        }
        for dir in include_paths.iter() {
            rules_debug!(context = context.clone(), "include path {}", dir.display());
        }
        rules_debug!(context = context.clone(), "flags: {}", flags.join(" "));

        let invocation = CompilerInvocation {
            executable: config.compiler.clone(),
            flags,
            sources: rule.sources.clone(),
            working_dir: config.base_dir.clone(),
        };
        let description = config
            .command_display
            .as_deref()
            .map(|template| describe(template, &targets, &invocation));

        rules_debug!(
            context = context,
            "emitted {} targets from {} sources",
            targets.len(),
            rule.sources.len()
        );

        Ok(EmissionResult {
            targets,
            sources: rule.sources.clone(),
            invocation,
            description,
        })
    }
}

/// Expand `$TARGETS`, `$SOURCES` and `$COMMAND` in a display template.
fn describe(template: &str, targets: &[PathBuf], invocation: &CompilerInvocation) -> String {
    template
        .replace("$TARGETS", &join_paths(targets.iter().cloned()))
        .replace("$SOURCES", &join_paths(invocation.absolute_sources()))
        .replace("$COMMAND", &invocation.command_line())
}

fn join_paths(paths: impl Iterator<Item = PathBuf>) -> String {
    paths
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
