//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Recognised rule options and their configuration-boundary types."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
//! Option tables accepted by a build rule.
//!
//! The same [`OptionSet`] type carries per-rule overrides and the process-wide
//! defaults table. Every field is optional; precedence is applied later by
//! [`crate::resolve::resolve`]. Keys use the `SCREAMING_SNAKE_CASE` spelling
//! found in build files, and keys that are not recognised are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{EmitError, Result};

/// Per-rule or process-wide option values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OptionSet {
    pub compiler_path: Option<PathBuf>,
    pub extra_flags: Option<FlagList>,
    pub include_paths: Option<PathList>,
    pub base_dir: Option<PathBuf>,

    pub native_out: Option<PathBuf>,
    pub native_grpc_out: Option<PathBuf>,
    pub script_out: Option<PathBuf>,
    pub script_grpc_out: Option<PathBuf>,

    pub native_grpc_plugin: Option<PathBuf>,
    pub script_grpc_plugin: Option<PathBuf>,

    pub source_suffix: Option<String>,
    pub native_header_suffix: Option<String>,
    pub native_source_suffix: Option<String>,
    pub native_grpc_header_suffix: Option<String>,
    pub native_grpc_source_suffix: Option<String>,
    pub script_suffix: Option<String>,
    pub script_grpc_suffix: Option<String>,

    pub custom_modes: Option<Vec<CustomModeSpec>>,
    pub command_display: Option<String>,
}

impl OptionSet {
    /// Interpret a TOML table as an option set.
    ///
    /// Structurally invalid values (for example an `INCLUDE_PATHS` entry that is
    /// neither a path nor a list of paths) surface as
    /// [`EmitError::Configuration`].
    pub fn from_table(table: &toml::Table) -> Result<Self> {
        let options: OptionSet = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|err| EmitError::configuration(err.to_string().trim_end().to_owned()))?;
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<()> {
        for spec in self.custom_modes.iter().flatten() {
            spec.validate()?;
        }
        Ok(())
    }
}

/// Additional generator configured alongside the built-in output modes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomModeSpec {
    /// Generator name; produces `--NAME_out` and registers `protoc-gen-NAME`.
    pub name: String,
    #[serde(default)]
    pub out: Option<PathBuf>,
    #[serde(default)]
    pub suffixes: Vec<String>,
    #[serde(default)]
    pub plugin: Option<PathBuf>,
}

impl CustomModeSpec {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EmitError::configuration("custom mode name cannot be empty"));
        }
        if self
            .name
            .chars()
            .any(|ch| ch.is_whitespace() || ch == '=' || ch == '/')
        {
            return Err(EmitError::configuration(format!(
                "custom mode name '{}' must not contain whitespace, '=' or '/'",
                self.name
            )));
        }
        if self.out.is_some() && self.suffixes.is_empty() {
            return Err(EmitError::configuration(format!(
                "custom mode '{}' declares an output directory but no suffixes",
                self.name
            )));
        }
        Ok(())
    }
}

/// Ordered list of paths. Accepts a single path or a sequence in build files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany<PathBuf>")]
pub struct PathList(Vec<PathBuf>);

impl PathList {
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<OneOrMany<PathBuf>> for PathList {
    fn from(raw: OneOrMany<PathBuf>) -> Self {
        PathList(raw.into_vec())
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for PathList {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        PathList(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<PathBuf>> for PathList {
    fn from(paths: Vec<PathBuf>) -> Self {
        PathList(paths)
    }
}

/// Raw compiler flags.
///
/// A single string is split on whitespace the way a command-line variable
/// would be; a sequence is kept verbatim, one flag per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany<String>")]
pub struct FlagList(Vec<String>);

impl FlagList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<OneOrMany<String>> for FlagList {
    fn from(raw: OneOrMany<String>) -> Self {
        match raw {
            OneOrMany::One(line) => FlagList(line.split_whitespace().map(str::to_owned).collect()),
            OneOrMany::Many(flags) => FlagList(flags),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for FlagList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FlagList(iter.into_iter().map(Into::into).collect())
    }
}

/// A single value or a sequence of values, as written in a build file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Whether a configured value counts as set. Empty strings, empty paths and
/// empty lists fall through to the next layer of defaults.
pub(crate) trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for PathBuf {
    fn is_present(&self) -> bool {
        !self.as_os_str().is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for PathList {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for FlagList {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

/// First present value: per-call, then defaults.
pub(crate) fn layered<'a, T: Presence>(
    per_call: &'a Option<T>,
    defaults: &'a Option<T>,
) -> Option<&'a T> {
    per_call
        .as_ref()
        .filter(|value| value.is_present())
        .or_else(|| defaults.as_ref().filter(|value| value.is_present()))
}
