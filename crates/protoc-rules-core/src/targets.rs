//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Derives the artifacts each enabled output mode produces."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use protoc_rules_logging::{rules_debug, LogContext};

use crate::resolve::ResolvedConfiguration;

/// Stem of `source`: its file name with `suffix` removed.
///
/// When the file name does not end with `suffix` the whole file name,
/// extension included, is used unchanged. Non-UTF-8 names keep their bytes.
pub fn stem(source: &Path, suffix: &str) -> OsString {
    let name = source.file_name().unwrap_or(OsStr::new(""));
    match strip_suffix(name, suffix) {
        Some(stem) => stem,
        None => {
            let display = source.display().to_string();
            rules_debug!(
                context = LogContext::new().with_source(&display),
                "source does not end with '{}', using full file name '{}' as stem",
                suffix,
                name.to_string_lossy()
            );
            name.to_os_string()
        }
    }
}

#[cfg(unix)]
fn strip_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    use std::os::unix::ffi::OsStrExt;

    if suffix.is_empty() {
        return None;
    }
    name.as_bytes()
        .strip_suffix(suffix.as_bytes())
        .map(|stem| OsStr::from_bytes(stem).to_os_string())
}

#[cfg(not(unix))]
fn strip_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    if suffix.is_empty() {
        return None;
    }
    name.to_str()?.strip_suffix(suffix).map(OsString::from)
}

/// Output artifacts for `sources` under `config`.
///
/// Sources are visited in input order, enabled modes in declaration order
/// and each mode's suffixes in declaration order.
pub fn derive_targets(sources: &[PathBuf], config: &ResolvedConfiguration) -> Vec<PathBuf> {
    let out_dirs: Vec<_> = config
        .enabled_modes()
        .filter_map(|mode| config.out_dir(mode).map(|dir| (mode, dir)))
        .collect();

    let mut targets = Vec::new();
    for source in sources {
        let stem = stem(source, &config.source_suffix);
        for (mode, dir) in &out_dirs {
            for suffix in &mode.suffixes {
                let mut file_name = stem.clone();
                file_name.push(suffix);
                targets.push(dir.join(file_name));
            }
        }
    }
    targets
}
