//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "One-time discovery of the schema compiler executable."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{EmitError, Result};

/// Well-known executable name searched for when no compiler is configured.
pub const COMPILER_NAME: &str = "protoc";

/// Lookup of an executable by name.
pub trait ExecutableSearch {
    fn find(&self, name: &str) -> Option<PathBuf>;
}

/// Directory list searched in order, as found in `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Search path taken from the `PATH` environment variable.
    pub fn from_env() -> Self {
        Self::from_var(env::var_os("PATH"))
    }

    pub fn from_var(value: Option<OsString>) -> Self {
        match value {
            Some(value) => Self::new(env::split_paths(&value).filter(|dir| !dir.as_os_str().is_empty())),
            None => Self::default(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl ExecutableSearch for SearchPath {
    fn find(&self, name: &str) -> Option<PathBuf> {
        self.dirs.iter().find_map(|dir| {
            executable_names(name)
                .map(|candidate| dir.join(candidate))
                .find(|path| is_executable(path))
        })
    }
}

#[cfg(windows)]
fn executable_names(name: &str) -> impl Iterator<Item = String> {
    let name = name.to_owned();
    [String::new(), ".exe".to_owned(), ".bat".to_owned(), ".cmd".to_owned()]
        .into_iter()
        .map(move |ext| format!("{name}{ext}"))
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> impl Iterator<Item = String> {
    std::iter::once(name.to_owned())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolve the compiler executable.
///
/// An explicit, non-empty path is returned unchanged without consulting
/// `search`; otherwise [`COMPILER_NAME`] is looked up.
pub fn locate(explicit: Option<&Path>, search: &dyn ExecutableSearch) -> Result<PathBuf> {
    if let Some(path) = explicit.filter(|path| !path.as_os_str().is_empty()) {
        debug!(compiler = %path.display(), "using configured compiler");
        return Ok(path.to_path_buf());
    }
    match search.find(COMPILER_NAME) {
        Some(path) => {
            debug!(compiler = %path.display(), "detected compiler on search path");
            Ok(path)
        }
        None => Err(EmitError::CompilerNotFound {
            name: COMPILER_NAME.to_owned(),
        }),
    }
}
