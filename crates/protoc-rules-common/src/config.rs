//! ---
//! rules_section: "01-core-functionality"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Shared configuration and logging setup."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use protoc_rules_core::{BuildRule, OptionSet};
use serde::Deserialize;
use tracing::debug;

use crate::logging::LogFormat;

/// Default build-file name looked up in the working directory.
pub const DEFAULT_BUILD_FILE: &str = "protoc-rules.toml";

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Parsed build file: logging settings, the process-wide option defaults and
/// the declared rules in file order.
#[derive(Debug, Clone, Default)]
pub struct BuildFile {
    pub logging: LoggingConfig,
    pub defaults: OptionSet,
    pub rules: IndexMap<String, BuildRule>,
}

/// Metadata describing where a [`BuildFile`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedBuildFile {
    pub build_file: BuildFile,
    pub source: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawBuildFile {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    defaults: toml::Table,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    name: String,
    sources: Vec<PathBuf>,
    #[serde(default)]
    base_dir: Option<PathBuf>,
    #[serde(flatten)]
    options: toml::Table,
}

impl BuildFile {
    pub const ENV_CONFIG_PATH: &'static str = "PROTOC_RULES_CONFIG";

    /// Load a build file from disk, respecting the `PROTOC_RULES_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.build_file)
    }

    /// Load a build file together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedBuildFile> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let build_file = Self::from_path(&path)?;
                return Ok(LoadedBuildFile {
                    build_file,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let build_file = Self::from_path(&path)?;
                return Ok(LoadedBuildFile {
                    build_file,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no build file found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Read and parse one build file.
    ///
    /// The defaults' base directory is the file's directory unless
    /// `[defaults]` names one; a relative one is taken from the file's
    /// directory. Rule base directories are left as written and resolve
    /// against the defaults at emission time.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(build_file = %path.display(), "loading build file");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read build file {}", path.display()))?;
        let mut build_file: BuildFile = contents
            .parse()
            .with_context(|| format!("failed to parse build file {}", path.display()))?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            let base_dir = match build_file.defaults.base_dir.take() {
                Some(base) if base.is_absolute() => base,
                Some(base) if !base.as_os_str().is_empty() => dir.join(base),
                _ => dir.to_path_buf(),
            };
            build_file.defaults.base_dir = Some(base_dir);
        }
        Ok(build_file)
    }

    /// Retrieve a rule by name.
    pub fn rule(&self, name: &str) -> Option<&BuildRule> {
        self.rules.get(name)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        for (name, rule) in &self.rules {
            if rule.sources.is_empty() {
                return Err(anyhow!("rule '{}' must list at least one source", name));
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for BuildFile {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let raw: RawBuildFile = toml::from_str(content).context("failed to parse build file")?;
        let defaults = OptionSet::from_table(&raw.defaults).context("invalid [defaults] table")?;

        let mut rules = IndexMap::new();
        for raw_rule in raw.rules {
            let name = raw_rule.name.trim().to_owned();
            if name.is_empty() {
                return Err(anyhow!("rule names cannot be empty"));
            }
            let mut options = OptionSet::from_table(&raw_rule.options)
                .with_context(|| format!("invalid options for rule '{}'", name))?;
            if let Some(base_dir) = raw_rule.base_dir.filter(|dir| !dir.as_os_str().is_empty()) {
                options.base_dir = Some(base_dir);
            }
            let rule = BuildRule::new(name.clone(), raw_rule.sources).with_options(options);
            if rules.insert(name.clone(), rule).is_some() {
                return Err(anyhow!("rule '{}' is declared more than once", name));
            }
        }

        let build_file = BuildFile {
            logging: raw.logging,
            defaults,
            rules,
        };
        build_file.validate()?;
        Ok(build_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for a rolling log file; file logging is off when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoc_rules_core::EmitError;

    const SAMPLE: &str = r#"
[logging]
format = "structured-json"

[defaults]
COMPILER_PATH = "/usr/bin/protoc"
INCLUDE_PATHS = "proto"

[[rules]]
name = "api"
sources = ["proto/api.proto", "proto/types.proto"]
NATIVE_OUT = "gen/cpp"
NATIVE_GRPC_OUT = "gen/cpp"
NATIVE_GRPC_PLUGIN = "/usr/bin/grpc_cpp_plugin"

[[rules]]
name = "scripts"
sources = ["proto/api.proto"]
SCRIPT_OUT = "gen/py"
UNKNOWN_OPTION = 1
"#;

    #[test]
    fn rules_keep_file_order_and_options() {
        let build_file: BuildFile = SAMPLE.parse().unwrap();
        assert_eq!(build_file.logging.format, LogFormat::StructuredJson);
        assert_eq!(
            build_file.defaults.compiler_path,
            Some(PathBuf::from("/usr/bin/protoc"))
        );
        let names: Vec<_> = build_file.rules.keys().cloned().collect();
        assert_eq!(names, ["api", "scripts"]);

        let api = build_file.rule("api").unwrap();
        assert_eq!(api.sources.len(), 2);
        assert_eq!(api.options.native_out, Some(PathBuf::from("gen/cpp")));
        assert_eq!(
            build_file.rule("scripts").unwrap().options.script_out,
            Some(PathBuf::from("gen/py"))
        );
    }

    #[test]
    fn duplicate_rule_names_are_rejected() {
        let raw = r#"
[[rules]]
name = "a"
sources = ["a.proto"]

[[rules]]
name = "a"
sources = ["b.proto"]
"#;
        let err = raw.parse::<BuildFile>().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rules_need_sources() {
        let raw = "[[rules]]\nname = \"empty\"\nsources = []\n";
        assert!(raw.parse::<BuildFile>().is_err());
    }

    #[test]
    fn malformed_include_paths_surface_configuration_error() {
        let raw = "[defaults]\nINCLUDE_PATHS = { nested = true }\n";
        let err = raw.parse::<BuildFile>().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EmitError>(),
            Some(EmitError::Configuration(_))
        ));
    }

    #[test]
    fn defaults_are_anchored_at_the_build_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_BUILD_FILE);
        fs::write(&path, SAMPLE).unwrap();
        let build_file = BuildFile::from_path(&path).unwrap();
        assert_eq!(build_file.defaults.base_dir.as_deref(), Some(dir.path()));
        for rule in build_file.rules.values() {
            assert_eq!(rule.options.base_dir, None);
        }
    }

    #[test]
    fn configured_base_directories_are_kept() {
        let raw = r#"
[defaults]
BASE_DIR = "/srv/repo"

[[rules]]
name = "sub"
sources = ["a.proto"]
base_dir = "sub"

[[rules]]
name = "upper"
sources = ["b.proto"]
BASE_DIR = "other"

[[rules]]
name = "plain"
sources = ["c.proto"]
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_BUILD_FILE);
        fs::write(&path, raw).unwrap();
        let build_file = BuildFile::from_path(&path).unwrap();

        assert_eq!(
            build_file.defaults.base_dir,
            Some(PathBuf::from("/srv/repo"))
        );
        let base_dir = |name: &str| build_file.rule(name).unwrap().options.base_dir.clone();
        assert_eq!(base_dir("sub"), Some(PathBuf::from("sub")));
        assert_eq!(base_dir("upper"), Some(PathBuf::from("other")));
        assert_eq!(base_dir("plain"), None);
    }

    #[test]
    fn relative_default_base_is_taken_from_the_build_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_BUILD_FILE);
        fs::write(&path, "[defaults]\nBASE_DIR = \"schemas\"\n").unwrap();
        let build_file = BuildFile::from_path(&path).unwrap();
        assert_eq!(
            build_file.defaults.base_dir,
            Some(dir.path().join("schemas"))
        );
    }
}
