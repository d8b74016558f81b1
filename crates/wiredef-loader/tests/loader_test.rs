//! Integration tests for loading definition documents from disk.
//!
//! Fixture documents live in `tests/fixtures/`. Import graphs that need
//! specific layouts are written to temporary directories.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::path::{Path, PathBuf};

use wiredef_common::config::LoaderConfig;
use wiredef_common::error::{DefinitionError, ErrorKind};
use wiredef_common::types::{
    Definition, DefinitionKind, DefinitionSet, FactoryCallable, Reference, Value,
};
use wiredef_loader::{ChainedProvider, DefinitionProvider, YamlDefinitionLoader};

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn load_fixture(name: &str) -> Result<DefinitionSet, DefinitionError> {
    YamlDefinitionLoader::new(fixture(name)).load()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn parameter_value<'a>(set: &'a DefinitionSet, id: &str) -> &'a Value {
    match set.get(id) {
        Some(Definition::Parameter(p)) => &p.value,
        other => panic!("expected parameter {id}, got {other:?}"),
    }
}

fn string_seq(items: &[&str]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::string(*s)).collect())
}

// ── Loading ──────────────────────────────────────────────────────────

#[test]
fn missing_file_is_resource_not_found() {
    let err = load_fixture("foo.yml").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    assert!(err.to_string().contains("foo.yml"), "got: {err}");
}

#[test]
fn remote_file_is_not_local() {
    let err = YamlDefinitionLoader::new("http://example.com/file.yml")
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotLocalResource);
}

#[test]
fn file_scheme_locator_is_loaded() {
    let set = YamlDefinitionLoader::new(format!("file://{}", fixture("parameters.yml")))
        .load()
        .expect("load");
    assert_eq!(set.len(), 6);
}

#[test]
fn empty_file_yields_empty_set() {
    let set = load_fixture("empty.yml").expect("load");
    assert!(set.is_empty());
}

#[test]
fn invalid_files_are_rejected_with_specific_kinds() {
    let cases = [
        ("malformed.yml", ErrorKind::MalformedDocument),
        ("not_a_mapping.yml", ErrorKind::NotAMapping),
        ("bad_top_level.yml", ErrorKind::UnexpectedTopLevelKey),
        ("bad_parameters.yml", ErrorKind::InvalidParametersSection),
        ("bad_imports.yml", ErrorKind::InvalidImportList),
        ("bad_import.yml", ErrorKind::InvalidImportEntry),
        ("bad_services.yml", ErrorKind::InvalidServicesSection),
        ("bad_service.yml", ErrorKind::InvalidServiceDeclaration),
        ("bad_calls.yml", ErrorKind::InvalidCallsList),
        ("bad_format.yml", ErrorKind::InvalidFactoryFormat),
        ("missing_kind.yml", ErrorKind::MissingDefinitionKind),
        ("remote_import.yml", ErrorKind::NotLocalResource),
    ];
    for (file, kind) in cases {
        let err = load_fixture(file).unwrap_err();
        assert_eq!(err.kind(), kind, "{file}: {err}");
        assert!(
            err.to_string().contains(file) || kind == ErrorKind::NotLocalResource,
            "{file}: message should name the file, got: {err}"
        );
    }
}

#[test]
fn ignore_errors_import_is_unsupported() {
    let err = load_fixture("ignore_errors.yml").unwrap_err();
    assert_eq!(err.unsupported_feature(), Some("ignore_errors"));
}

// ── Parameters and imports ───────────────────────────────────────────

#[test]
fn parameters_are_loaded_verbatim() {
    let set = load_fixture("parameters.yml").expect("load");

    assert_eq!(set.len(), 6);
    assert_eq!(set.count_kind(DefinitionKind::Parameter), 6);
    assert_eq!(parameter_value(&set, "foo"), &Value::string("bar"));
    assert_eq!(
        parameter_value(&set, "MixedCase"),
        &Value::Mapping(vec![("MixedCaseKey".into(), Value::string("value"))])
    );
    let Value::Sequence(values) = parameter_value(&set, "values") else {
        panic!("values should be a sequence");
    };
    assert_eq!(values.len(), 4);
    assert_eq!(values[0], Value::Bool(true));
    assert_eq!(values[2], Value::from(0_i64));
    assert_eq!(parameter_value(&set, "foo_bar"), &Value::string("@foo_bar"));
    assert_eq!(parameter_value(&set, "escaped"), &Value::string("@name"));
}

#[test]
fn imports_merge_with_later_imports_and_local_parameters_winning() {
    let set = load_fixture("imports.yml").expect("load");

    assert_eq!(parameter_value(&set, "foo"), &Value::string("foo"));
    assert_eq!(parameter_value(&set, "bar"), &Value::string("overridden"));
    assert_eq!(
        parameter_value(&set, "values"),
        &Value::Sequence(vec![Value::Bool(true), Value::Bool(false)])
    );
    assert_eq!(parameter_value(&set, "foo_bar"), &Value::string("@foo_bar"));
    assert!(set.contains("MixedCase"));
}

#[test]
fn absolute_import_paths_are_used_as_is() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let shared = write(dir.path(), "shared/params.yml", "parameters:\n  shared: yes\n");
    let main = write(
        dir.path(),
        "app/main.yml",
        &format!("imports:\n  - {{ resource: '{}' }}\n", shared.display()),
    );

    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    assert!(set.contains("shared"));
}

#[test]
fn nested_relative_imports_resolve_against_their_own_document() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(dir.path(), "main.yml", "imports:\n  - { resource: a/first.yml }\n");
    let _ = write(
        dir.path(),
        "a/first.yml",
        "imports:\n  - { resource: b/second.yml }\nparameters:\n  first: 1\n",
    );
    let _ = write(dir.path(), "a/b/second.yml", "parameters:\n  second: 2\n");

    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    assert!(set.contains("first"));
    assert!(set.contains("second"));
}

#[test]
fn later_import_overrides_earlier_import() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(
        dir.path(),
        "main.yml",
        "imports:\n  - { resource: one.yml }\n  - { resource: two.yml }\n",
    );
    let _ = write(dir.path(), "one.yml", "services:\n  logger: { class: FileLogger }\n");
    let _ = write(dir.path(), "two.yml", "services:\n  logger: '@null_logger'\n");

    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    assert_eq!(set.get("logger").map(Definition::kind), Some(DefinitionKind::Alias));
}

#[test]
fn error_in_imported_document_aborts_load() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(
        dir.path(),
        "main.yml",
        "imports:\n  - { resource: bad.yml }\nparameters:\n  ok: 1\n",
    );
    let _ = write(dir.path(), "bad.yml", "services:\n  s: { class: Foo, lazy: true }\n");

    let err = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .unwrap_err();
    assert_eq!(err.unsupported_feature(), Some("lazy"));
    assert!(err.to_string().contains("bad.yml"), "got: {err}");
}

#[test]
fn missing_import_is_resource_not_found() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(dir.path(), "main.yml", "imports:\n  - { resource: nope.yml }\n");

    let err = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
}

// ── Cycles ───────────────────────────────────────────────────────────

#[test]
fn cyclic_imports_are_detected() {
    let err = load_fixture("cycle_a.yml").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicImport);
    let msg = err.to_string();
    assert!(msg.contains("cycle_a.yml") && msg.contains("cycle_b.yml"), "got: {msg}");
}

#[test]
fn self_import_is_a_cycle() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(dir.path(), "self.yml", "imports:\n  - { resource: ./self.yml }\n");

    let err = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicImport);
}

#[test]
fn same_document_imported_twice_is_not_a_cycle() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(
        dir.path(),
        "main.yml",
        "imports:\n  - { resource: common.yml }\n  - { resource: other.yml }\n",
    );
    let _ = write(dir.path(), "other.yml", "imports:\n  - { resource: common.yml }\n");
    let _ = write(dir.path(), "common.yml", "parameters:\n  common: 1\n");

    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    assert!(set.contains("common"));
}

#[test]
fn import_depth_is_bounded() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    for level in 0..4 {
        let _ = write(
            dir.path(),
            &format!("level{level}.yml"),
            &format!("imports:\n  - {{ resource: level{}.yml }}\n", level + 1),
        );
    }
    let _ = write(dir.path(), "level4.yml", "parameters:\n  deep: true\n");
    let root = dir.path().join("level0.yml").to_string_lossy().into_owned();

    let shallow = LoaderConfig::default().with_max_import_depth(2);
    let err = YamlDefinitionLoader::with_config(root.clone(), shallow)
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ImportTooDeep);

    let deep_enough = LoaderConfig::default().with_max_import_depth(4);
    let set = YamlDefinitionLoader::with_config(root, deep_enough)
        .load()
        .expect("load");
    assert!(set.contains("deep"));
}

// ── Services ─────────────────────────────────────────────────────────

#[test]
fn services_are_parsed_into_definitions() {
    let set = load_fixture("services.yml").expect("load");

    let Some(Definition::Instance(foo)) = set.get("foo") else {
        panic!("foo should be an instance");
    };
    assert_eq!(foo.class, "FooClass");

    let Some(Definition::Instance(arguments)) = set.get("arguments") else {
        panic!("arguments should be an instance");
    };
    assert_eq!(
        arguments.arguments,
        vec![
            Value::string("foo"),
            Value::reference("foo"),
            Value::Sequence(vec![Value::Bool(true), Value::Bool(false)]),
            Value::string("@foo"),
        ]
    );

    let Some(Definition::Instance(call2)) = set.get("method_call2") else {
        panic!("method_call2 should be an instance");
    };
    assert_eq!(call2.calls[0].method, "setBar");
    assert_eq!(
        call2.calls[0].arguments,
        vec![
            Value::string("foo"),
            Value::reference("foo"),
            Value::Sequence(vec![Value::Bool(true), Value::Bool(false)]),
        ]
    );

    let Some(Definition::Instance(manager)) = set.get("manager") else {
        panic!("manager should be an instance");
    };
    assert_eq!(manager.calls[0].method, "setLogger");
    assert_eq!(manager.calls[0].arguments, vec![Value::reference("logger")]);

    let Some(Definition::Instance(props)) = set.get("instance_with_properties") else {
        panic!("instance_with_properties should be an instance");
    };
    assert_eq!(props.properties[0].name, "foo");
    assert_eq!(props.properties[0].value, Value::string("bar"));
    assert_eq!(props.properties[1].name, "bar");
    assert_eq!(props.properties[1].value.as_reference(), Some(&Reference::new("baz")));
}

#[test]
fn factories_are_parsed() {
    let set = load_fixture("services.yml").expect("load");

    let factory = |id: &str| match set.get(id) {
        Some(Definition::Factory(f)) => f.clone(),
        other => panic!("{id} should be a factory, got {other:?}"),
    };

    assert_eq!(
        factory("new_factory1").callable,
        FactoryCallable::Static {
            type_name: "FooBacFactory".into(),
            method: "createFooBar".into(),
        }
    );
    assert_eq!(
        factory("new_factory2").callable,
        FactoryCallable::Service {
            reference: Reference::new("foo"),
            method: "method".into(),
        }
    );
    let third = factory("new_factory3");
    assert_eq!(
        third.callable,
        FactoryCallable::Service {
            reference: Reference::new("baz"),
            method: "getClass".into(),
        }
    );
    assert_eq!(third.arguments, vec![Value::from(1_i64), Value::reference("foo")]);
}

#[test]
fn aliases_are_parsed() {
    let set = load_fixture("services.yml").expect("load");

    for id in ["alias_for_foo", "another_alias_for_foo"] {
        let Some(Definition::Alias(alias)) = set.get(id) else {
            panic!("{id} should be an alias");
        };
        assert_eq!(alias.target, "foo");
    }
}

#[test]
fn escaped_alias_shorthand_targets_literal() {
    let set = load_fixture("services.yml").expect("load");
    let Some(Definition::Alias(alias)) = set.get("escaped_alias") else {
        panic!("escaped_alias should be an alias");
    };
    assert_eq!(alias.target, "@literal");
}

#[test]
fn method_calls_keep_document_order() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let methods: Vec<String> = (0..12).map(|i| format!("step{i}")).collect();
    let calls: String = methods
        .iter()
        .map(|m| format!("      - [{m}, ['@dep']]\n"))
        .collect();
    let main = write(
        dir.path(),
        "calls.yml",
        &format!("services:\n  pipeline:\n    class: Pipeline\n    calls:\n{calls}"),
    );

    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    let Some(Definition::Instance(pipeline)) = set.get("pipeline") else {
        panic!("pipeline should be an instance");
    };
    let loaded: Vec<&str> = pipeline.calls.iter().map(|c| c.method.as_str()).collect();
    assert_eq!(loaded, methods.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn unsupported_directive_produces_no_partial_definitions() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(
        dir.path(),
        "main.yml",
        "services:\n  ok: { class: Fine }\n  bad: { class: Foo, shared: true }\n",
    );

    let result = YamlDefinitionLoader::new(main.to_string_lossy()).load();
    let err = result.unwrap_err();
    assert_eq!(err.unsupported_feature(), Some("shared"));
    assert!(err.to_string().contains("\"bad\""), "got: {err}");
}

#[test]
fn unsupported_reference_forms_are_rejected_in_services() {
    let cases = [
        ("'@=service(\"x\")'", "expression"),
        ("'@?maybe'", "optional-reference"),
        ("'@lenient='", "non-strict-reference"),
    ];
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    for (argument, feature) in cases {
        let main = write(
            dir.path(),
            "main.yml",
            &format!("services:\n  s:\n    class: Foo\n    arguments: [{argument}]\n"),
        );
        let err = YamlDefinitionLoader::new(main.to_string_lossy())
            .load()
            .unwrap_err();
        assert_eq!(err.unsupported_feature(), Some(feature), "{argument}");
    }
}

#[test]
fn merge_keys_are_expanded_before_services_are_parsed() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(
        dir.path(),
        "main.yml",
        "services:\n  base: &base { class: Foo }\n  child: { <<: *base, arguments: [1] }\n",
    );

    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    let Some(Definition::Instance(child)) = set.get("child") else {
        panic!("child should be an instance");
    };
    assert_eq!(child.class, "Foo");
    assert_eq!(child.arguments, vec![Value::from(1_i64)]);
}

#[test]
fn merged_unsupported_directive_is_rejected() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(
        dir.path(),
        "main.yml",
        "services:\n  child: { <<: { shared: true }, class: Foo }\n",
    );

    let err = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .unwrap_err();
    assert_eq!(err.unsupported_feature(), Some("shared"));
}

#[test]
fn non_utf8_document_is_malformed() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = dir.path().join("latin1.yml");
    std::fs::write(&main, b"parameters:\n  name: caf\xe9\n").expect("write fixture");

    let err = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDocument);
}

// ── Precedence ───────────────────────────────────────────────────────

#[test]
fn local_parameter_beats_imported_service() {
    let set = load_fixture("precedence.yml").expect("load");
    assert_eq!(parameter_value(&set, "x"), &Value::from(1_i64));
}

#[test]
fn imported_definition_beats_local_service() {
    let set = load_fixture("precedence.yml").expect("load");
    let Some(Definition::Alias(shared)) = set.get("shared_id") else {
        panic!("shared_id should keep the imported alias");
    };
    assert_eq!(shared.target, "imported_target");
    assert_eq!(set.get("own").map(Definition::kind), Some(DefinitionKind::Instance));
}

#[test]
fn local_service_precedence_is_keep_existing() {
    assert_eq!(
        wiredef_loader::LOCAL_SERVICE_PRECEDENCE,
        wiredef_common::types::CollisionPolicy::KeepExisting
    );
}

// ── Properties ───────────────────────────────────────────────────────

#[test]
fn loading_twice_is_idempotent() {
    for name in ["services.yml", "imports.yml", "precedence.yml", "empty.yml"] {
        let first = load_fixture(name).expect("first load");
        let second = load_fixture(name).expect("second load");
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn references_target_text_after_marker() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let targets = ["db", "app.mailer", "Some\\Class", "a-b_c", "x=y"];
    let arguments = targets
        .iter()
        .map(|t| format!("'@{t}'"))
        .collect::<Vec<_>>()
        .join(", ");
    let main = write(
        dir.path(),
        "refs.yml",
        &format!("services:\n  s:\n    class: Foo\n    arguments: [{arguments}]\n"),
    );

    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    let Some(Definition::Instance(s)) = set.get("s") else {
        panic!("s should be an instance");
    };
    let expected: Vec<Value> = targets.iter().map(|t| Value::reference(*t)).collect();
    assert_eq!(s.arguments, expected);
}

#[test]
fn definition_set_serializes_to_json() {
    let set = load_fixture("services.yml").expect("load");
    let json = serde_json::to_value(&set).expect("serialize");
    assert_eq!(json["alias_for_foo"]["kind"], "alias");
    assert_eq!(json["new_factory2"]["callable"]["type"], "service");
    assert_eq!(json["arguments"]["arguments"][1]["$ref"], "foo");
    assert_eq!(json["arguments"]["arguments"][3], "@foo");
}

// ── Providers ────────────────────────────────────────────────────────

#[test]
fn chained_documents_merge_first_writer_wins() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let first = write(dir.path(), "first.yml", "parameters:\n  env: prod\n  only_first: 1\n");
    let second = write(dir.path(), "second.yml", "parameters:\n  env: dev\n  only_second: 2\n");

    let chain = ChainedProvider::from_locators(
        [first.to_string_lossy().into_owned(), second.to_string_lossy().into_owned()],
        &LoaderConfig::default(),
    );
    let set = chain.definitions().expect("definitions");

    assert_eq!(parameter_value(&set, "env"), &Value::string("prod"));
    assert!(set.contains("only_first"));
    assert!(set.contains("only_second"));
}

#[test]
fn chained_provider_fails_on_any_failing_document() {
    let chain = ChainedProvider::from_locators(
        [fixture("parameters.yml"), fixture("bad_service.yml")],
        &LoaderConfig::default(),
    );
    let err = chain.definitions().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidServiceDeclaration);
}

#[test]
fn parameters_never_become_references() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let main = write(dir.path(), "p.yml", "parameters:\n  list: ['@a', '@@b']\n");
    let set = YamlDefinitionLoader::new(main.to_string_lossy())
        .load()
        .expect("load");
    assert_eq!(parameter_value(&set, "list"), &string_seq(&["@a", "@b"]));
    assert!(!parameter_value(&set, "list").contains_reference());
}
