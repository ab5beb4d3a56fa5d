//! ---
//! rules_section: "02-emission"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Output modes supported by the schema compiler."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SOURCE_SUFFIX: &str = ".proto";
pub const DEFAULT_NATIVE_HEADER_SUFFIX: &str = ".pb.h";
pub const DEFAULT_NATIVE_SOURCE_SUFFIX: &str = ".pb.cc";
pub const DEFAULT_NATIVE_GRPC_HEADER_SUFFIX: &str = ".grpc.pb.h";
pub const DEFAULT_NATIVE_GRPC_SOURCE_SUFFIX: &str = ".grpc.pb.cc";
pub const DEFAULT_SCRIPT_SUFFIX: &str = "_pb2.py";
pub const DEFAULT_SCRIPT_GRPC_SUFFIX: &str = "_pb2_grpc.py";

/// Generation target of the compiler.
///
/// Built-in kinds are declared in the order their targets and flags are
/// emitted; custom kinds follow in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Cpp,
    GrpcCpp,
    Python,
    GrpcPython,
    Custom(String),
}

impl OutputKind {
    pub const BUILTIN: [OutputKind; 4] = [
        OutputKind::Cpp,
        OutputKind::GrpcCpp,
        OutputKind::Python,
        OutputKind::GrpcPython,
    ];

    /// Generator name as it appears in `--NAME_out`.
    pub fn generator(&self) -> &str {
        match self {
            OutputKind::Cpp => "cpp",
            OutputKind::GrpcCpp => "grpc-cpp",
            OutputKind::Python => "python",
            OutputKind::GrpcPython => "grpc-python",
            OutputKind::Custom(name) => name,
        }
    }

    /// Name under which a plugin executable is registered, if the kind is
    /// plugin based.
    pub fn plugin_name(&self) -> Option<String> {
        match self {
            OutputKind::Cpp | OutputKind::Python => None,
            OutputKind::GrpcCpp | OutputKind::GrpcPython | OutputKind::Custom(_) => {
                Some(format!("protoc-gen-{}", self.generator()))
            }
        }
    }

    pub fn out_flag(&self) -> String {
        format!("--{}_out", self.generator())
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.generator())
    }
}

/// One independently enabled generation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMode {
    pub kind: OutputKind,
    /// Output directory; the mode is disabled when absent.
    pub out_dir: Option<PathBuf>,
    /// Suffixes appended to a source's stem, in emission order.
    pub suffixes: Vec<String>,
    pub plugin: Option<PathBuf>,
}

impl OutputMode {
    pub fn new(kind: OutputKind, suffixes: Vec<String>) -> Self {
        Self {
            kind,
            out_dir: None,
            suffixes,
            plugin: None,
        }
    }

    pub fn with_out_dir(mut self, out_dir: Option<PathBuf>) -> Self {
        self.out_dir = out_dir;
        self
    }

    pub fn with_plugin(mut self, plugin: Option<PathBuf>) -> Self {
        self.plugin = plugin;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.out_dir.is_some()
    }
}
