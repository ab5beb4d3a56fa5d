//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Merges per-rule overrides with process-wide defaults."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use crate::errors::{EmitError, Result};
use crate::mode::{
    OutputKind, OutputMode, DEFAULT_NATIVE_GRPC_HEADER_SUFFIX, DEFAULT_NATIVE_GRPC_SOURCE_SUFFIX,
    DEFAULT_NATIVE_HEADER_SUFFIX, DEFAULT_NATIVE_SOURCE_SUFFIX, DEFAULT_SCRIPT_GRPC_SUFFIX,
    DEFAULT_SCRIPT_SUFFIX, DEFAULT_SOURCE_SUFFIX,
};
use crate::options::{layered, OptionSet, Presence};
use crate::paths::normalize;

/// Fully merged option values for one emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub compiler: PathBuf,
    pub extra_flags: Vec<String>,
    /// Explicit include directories, as configured.
    pub include_paths: Vec<PathBuf>,
    /// Output modes in declaration order, disabled ones included.
    pub modes: Vec<OutputMode>,
    pub source_suffix: String,
    /// Absolute directory relative paths are interpreted against.
    pub base_dir: PathBuf,
    pub command_display: Option<String>,
}

impl ResolvedConfiguration {
    pub fn enabled_modes(&self) -> impl Iterator<Item = &OutputMode> {
        self.modes.iter().filter(|mode| mode.is_enabled())
    }

    /// Output directory of `mode` made absolute, if the mode is enabled.
    pub fn out_dir(&self, mode: &OutputMode) -> Option<PathBuf> {
        mode.out_dir
            .as_deref()
            .map(|dir| normalize(dir, &self.base_dir))
    }
}

/// Merge `per_call` over `defaults`.
///
/// For every option the per-call value wins, then the defaults table, then
/// the built-in literal. Neither input is modified. Fails only when no
/// compiler path or no usable base directory results.
pub fn resolve(per_call: &OptionSet, defaults: &OptionSet) -> Result<ResolvedConfiguration> {
    let compiler = layered(&per_call.compiler_path, &defaults.compiler_path)
        .cloned()
        .ok_or_else(|| EmitError::configuration("no compiler executable configured"))?;

    let base_dir = resolve_base_dir(per_call, defaults)?;

    let suffix = |call: &Option<String>, fallback: &Option<String>, literal: &str| {
        layered(call, fallback)
            .cloned()
            .unwrap_or_else(|| literal.to_owned())
    };
    let path = |call: &Option<PathBuf>, fallback: &Option<PathBuf>| {
        layered(call, fallback).cloned()
    };

    let mut modes = vec![
        OutputMode::new(
            OutputKind::Cpp,
            vec![
                suffix(
                    &per_call.native_header_suffix,
                    &defaults.native_header_suffix,
                    DEFAULT_NATIVE_HEADER_SUFFIX,
                ),
                suffix(
                    &per_call.native_source_suffix,
                    &defaults.native_source_suffix,
                    DEFAULT_NATIVE_SOURCE_SUFFIX,
                ),
            ],
        )
        .with_out_dir(path(&per_call.native_out, &defaults.native_out)),
        OutputMode::new(
            OutputKind::GrpcCpp,
            vec![
                suffix(
                    &per_call.native_grpc_header_suffix,
                    &defaults.native_grpc_header_suffix,
                    DEFAULT_NATIVE_GRPC_HEADER_SUFFIX,
                ),
                suffix(
                    &per_call.native_grpc_source_suffix,
                    &defaults.native_grpc_source_suffix,
                    DEFAULT_NATIVE_GRPC_SOURCE_SUFFIX,
                ),
            ],
        )
        .with_out_dir(path(&per_call.native_grpc_out, &defaults.native_grpc_out))
        .with_plugin(path(&per_call.native_grpc_plugin, &defaults.native_grpc_plugin)),
        OutputMode::new(
            OutputKind::Python,
            vec![suffix(
                &per_call.script_suffix,
                &defaults.script_suffix,
                DEFAULT_SCRIPT_SUFFIX,
            )],
        )
        .with_out_dir(path(&per_call.script_out, &defaults.script_out)),
        OutputMode::new(
            OutputKind::GrpcPython,
            vec![suffix(
                &per_call.script_grpc_suffix,
                &defaults.script_grpc_suffix,
                DEFAULT_SCRIPT_GRPC_SUFFIX,
            )],
        )
        .with_out_dir(path(&per_call.script_grpc_out, &defaults.script_grpc_out))
        .with_plugin(path(&per_call.script_grpc_plugin, &defaults.script_grpc_plugin)),
    ];

    if let Some(custom) = layered(&per_call.custom_modes, &defaults.custom_modes) {
        for spec in custom {
            spec.validate()?;
            if modes.iter().any(|mode| mode.kind.generator() == spec.name) {
                return Err(EmitError::configuration(format!(
                    "output mode '{}' is declared more than once",
                    spec.name
                )));
            }
            modes.push(
                OutputMode::new(OutputKind::Custom(spec.name.clone()), spec.suffixes.clone())
                    .with_out_dir(spec.out.clone().filter(|dir| !dir.as_os_str().is_empty()))
                    .with_plugin(spec.plugin.clone().filter(|p| !p.as_os_str().is_empty())),
            );
        }
    }

    Ok(ResolvedConfiguration {
        compiler,
        extra_flags: layered(&per_call.extra_flags, &defaults.extra_flags)
            .map(|flags| flags.as_slice().to_vec())
            .unwrap_or_default(),
        include_paths: layered(&per_call.include_paths, &defaults.include_paths)
            .map(|paths| paths.iter().map(Path::to_path_buf).collect())
            .unwrap_or_default(),
        modes,
        source_suffix: suffix(
            &per_call.source_suffix,
            &defaults.source_suffix,
            DEFAULT_SOURCE_SUFFIX,
        ),
        base_dir,
        command_display: layered(&per_call.command_display, &defaults.command_display).cloned(),
    })
}

/// A relative per-call base directory is anchored at the defaults' base
/// directory, which must itself be absolute.
fn resolve_base_dir(per_call: &OptionSet, defaults: &OptionSet) -> Result<PathBuf> {
    let anchor = defaults
        .base_dir
        .as_ref()
        .filter(|dir| dir.is_present() && dir.is_absolute());
    let requested = per_call.base_dir.as_ref().filter(|dir| dir.is_present());
    match (requested, anchor) {
        (Some(dir), _) if dir.is_absolute() => Ok(normalize(dir, dir)),
        (Some(dir), Some(anchor)) => Ok(normalize(dir, anchor)),
        (None, Some(anchor)) => Ok(anchor.clone()),
        (Some(dir), None) => Err(EmitError::configuration(format!(
            "base directory {} is relative and no absolute default is configured",
            dir.display()
        ))),
        (None, None) => Err(EmitError::configuration(
            "no absolute base directory configured",
        )),
    }
}
