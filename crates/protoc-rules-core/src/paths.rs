//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Lexical path normalisation and the include-path set."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use path_absolutize::Absolutize;

/// Make `path` absolute against `base` and resolve `.`/`..` components
/// without touching the filesystem. `base` must be absolute.
pub fn normalize(path: &Path, base: &Path) -> PathBuf {
    match path.absolutize_from(base) {
        Ok(absolute) => absolute.into_owned(),
        Err(_) => base.join(path),
    }
}

/// Directory containing `source`, after normalisation.
pub fn source_dir(source: &Path, base: &Path) -> PathBuf {
    let absolute = normalize(source, base);
    match absolute.parent() {
        Some(parent) => parent.to_path_buf(),
        None => absolute,
    }
}

/// Order-preserving set of compiler search directories.
///
/// Entries are compared by their absolute, normalised spelling, so `proto`
/// and `./proto/../proto` added against the same base collapse into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludePaths {
    base: PathBuf,
    entries: IndexSet<PathBuf>,
}

impl IncludePaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            entries: IndexSet::new(),
        }
    }

    /// Build the search list for a rule: explicit entries first, in the
    /// order configured, then each source's directory in source order.
    pub fn for_rule<'a, E, S>(base: &Path, explicit: E, sources: S) -> Self
    where
        E: IntoIterator<Item = &'a Path>,
        S: IntoIterator<Item = &'a Path>,
    {
        let mut paths = Self::new(base);
        for dir in explicit {
            paths.add(dir);
        }
        for source in sources {
            let dir = source_dir(source, base);
            paths.add(dir);
        }
        paths
    }

    /// Insert `candidate` unless an equal absolute path is already present.
    /// Returns whether the set grew.
    pub fn add(&mut self, candidate: impl AsRef<Path>) -> bool {
        let absolute = normalize(candidate.as_ref(), &self.base);
        self.entries.insert(absolute)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.entries.iter().cloned().collect()
    }
}
