//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Assembles the ordered compiler command-line flags."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use crate::paths::{normalize, IncludePaths};
use crate::resolve::ResolvedConfiguration;

/// Compiler flags for one emission.
///
/// Plugin registrations come first, then one `_out` flag per enabled mode,
/// then one `--proto_path` per include directory, then the caller's extra
/// flags verbatim so they can rebind anything emitted before them.
pub fn assemble_flags(config: &ResolvedConfiguration, include_paths: &IncludePaths) -> Vec<String> {
    let mut flags = Vec::new();

    // A configured plugin is registered even when its mode has no output
    // directory.
    for mode in &config.modes {
        if let (Some(name), Some(plugin)) = (mode.kind.plugin_name(), &mode.plugin) {
            let plugin = normalize(plugin, &config.base_dir);
            flags.push(format!("--plugin={}={}", name, plugin.display()));
        }
    }

    for mode in config.enabled_modes() {
        if let Some(dir) = config.out_dir(mode) {
            flags.push(format!("{}={}", mode.kind.out_flag(), dir.display()));
        }
    }

    for dir in include_paths.iter() {
        flags.push(format!("--proto_path={}", dir.display()));
    }

    flags.extend(config.extra_flags.iter().cloned());
    flags
}
