//! ---
//! rules_section: "15-testing-qa"
//! rules_subsection: "integration-tests"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Integration tests driving build files through the emitter."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use protoc_rules_common::BuildFile;
use protoc_rules_core::{EmitError, Emitter, SearchPath, Toolchain};

const BUILD_FILE: &str = r#"
[defaults]
COMPILER_PATH = "/usr/local/bin/protoc"
INCLUDE_PATHS = ["third_party", "./third_party"]
EXTRA_FLAGS = "--experimental_allow_proto3_optional"

[[rules]]
name = "service"
sources = ["proto/svc/service.proto", "proto/common/types.proto"]
NATIVE_OUT = "gen/cpp"
NATIVE_GRPC_OUT = "gen/cpp"
NATIVE_GRPC_PLUGIN = "tools/grpc_cpp_plugin"

[[rules]]
name = "legacy"
sources = ["schemas/legacy.schema"]
SOURCE_SUFFIX = ".schema"
SCRIPT_OUT = "gen/py"
EXTRA_FLAGS = []

[[rules]]
name = "go"
sources = ["proto/svc/service.proto"]
CUSTOM_MODES = [{ name = "go", out = "gen/go", suffixes = [".pb.go"], plugin = "tools/protoc-gen-go" }]
"#;

fn load() -> (tempfile::TempDir, BuildFile) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("protoc-rules.toml");
    fs::write(&path, BUILD_FILE).expect("write build file");
    let build_file = BuildFile::from_path(&path).expect("build file parses");
    (dir, build_file)
}

fn emitter(build_file: &BuildFile) -> Emitter {
    let toolchain = Toolchain::configure(build_file.defaults.clone(), &SearchPath::default())
        .expect("explicit compiler");
    Emitter::new(Arc::new(toolchain))
}

#[test]
fn service_rule_emits_native_and_grpc_targets() {
    let (dir, build_file) = load();
    let root = dir.path();
    let result = emitter(&build_file)
        .emit(build_file.rule("service").expect("rule"))
        .expect("emission");

    let gen = root.join("gen/cpp");
    assert_eq!(
        result.targets,
        vec![
            gen.join("service.pb.h"),
            gen.join("service.pb.cc"),
            gen.join("service.grpc.pb.h"),
            gen.join("service.grpc.pb.cc"),
            gen.join("types.pb.h"),
            gen.join("types.pb.cc"),
            gen.join("types.grpc.pb.h"),
            gen.join("types.grpc.pb.cc"),
        ]
    );

    let expected_flags = vec![
        format!(
            "--plugin=protoc-gen-grpc-cpp={}",
            root.join("tools/grpc_cpp_plugin").display()
        ),
        format!("--cpp_out={}", gen.display()),
        format!("--grpc-cpp_out={}", gen.display()),
        format!("--proto_path={}", root.join("third_party").display()),
        format!("--proto_path={}", root.join("proto/svc").display()),
        format!("--proto_path={}", root.join("proto/common").display()),
        "--experimental_allow_proto3_optional".to_owned(),
    ];
    assert_eq!(result.invocation.flags, expected_flags);
    assert_eq!(
        result.sources,
        vec![
            PathBuf::from("proto/svc/service.proto"),
            PathBuf::from("proto/common/types.proto"),
        ]
    );
    assert_eq!(result.invocation.executable, PathBuf::from("/usr/local/bin/protoc"));
}

#[test]
fn rule_level_suffix_and_empty_flags_fall_back_to_defaults() {
    let (dir, build_file) = load();
    let result = emitter(&build_file)
        .emit(build_file.rule("legacy").expect("rule"))
        .expect("emission");
    assert_eq!(
        result.targets,
        vec![dir.path().join("gen/py/legacy_pb2.py")]
    );
    assert_eq!(
        result.invocation.flags.last().map(String::as_str),
        Some("--experimental_allow_proto3_optional")
    );
}

#[test]
fn custom_generator_rule() {
    let (dir, build_file) = load();
    let result = emitter(&build_file)
        .emit(build_file.rule("go").expect("rule"))
        .expect("emission");
    assert_eq!(result.targets, vec![dir.path().join("gen/go/service.pb.go")]);
    assert_eq!(
        result.invocation.flags[0],
        format!(
            "--plugin=protoc-gen-go={}",
            dir.path().join("tools/protoc-gen-go").display()
        )
    );
    assert_eq!(
        result.invocation.flags[1],
        format!("--go_out={}", dir.path().join("gen/go").display())
    );
}

#[test]
fn every_rule_emits_identically_twice() {
    let (_dir, build_file) = load();
    let emitter = emitter(&build_file);
    for rule in build_file.rules.values() {
        let first = emitter.emit(rule).expect("emission");
        let second = emitter.emit(rule).expect("emission");
        assert_eq!(first, second, "rule {}", rule.name);
    }
}

#[test]
fn build_file_without_compiler_needs_discovery() {
    let build_file: BuildFile = "[[rules]]\nname = \"a\"\nsources = [\"a.proto\"]\n"
        .parse()
        .expect("parses");
    let err = Toolchain::configure(build_file.defaults.clone(), &SearchPath::default())
        .expect_err("nothing to discover");
    assert!(matches!(err, EmitError::CompilerNotFound { .. }));
}

#[test]
fn rule_base_dir_resolves_under_the_default_base() {
    let raw = r#"
[defaults]
COMPILER_PATH = "/usr/local/bin/protoc"
BASE_DIR = "schemas"

[[rules]]
name = "nested"
sources = ["api.proto"]
base_dir = "sub"
SCRIPT_OUT = "gen"

[[rules]]
name = "shared"
sources = ["api.proto"]
SCRIPT_OUT = "gen"
"#;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("protoc-rules.toml");
    fs::write(&path, raw).expect("write build file");
    let build_file = BuildFile::from_path(&path).expect("build file parses");
    let emitter = emitter(&build_file);
    let base = dir.path().join("schemas");

    let nested = emitter
        .emit(build_file.rule("nested").expect("rule"))
        .expect("emission");
    assert_eq!(nested.targets, vec![base.join("sub/gen/api_pb2.py")]);
    assert_eq!(nested.invocation.working_dir, base.join("sub"));

    let shared = emitter
        .emit(build_file.rule("shared").expect("rule"))
        .expect("emission");
    assert_eq!(shared.targets, vec![base.join("gen/api_pb2.py")]);
}
