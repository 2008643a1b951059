use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use section_edit_config::{Config, ConfigError, ConfigSourceKind, LoadOptions, CONFIG_FILE_NAME};
use section_edit_core::MatchMode;
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert!(!config.editor.padding);
    assert_eq!(config.editor.match_mode, MatchMode::Literal);
    assert_eq!(config.syntax.start, "<-- {name}");
    assert_eq!(config.syntax.end, "--> {name}");
    assert_eq!(config.sources.working_directory, working_dir);
    assert_eq!(config.sources.layers.len(), 1);
    assert_eq!(config.sources.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn applies_precedence_and_merges_fields() {
    let temp = TempDir::new().expect("tempdir");
    let git_root = canonical(temp.path());
    fs::create_dir(git_root.join(".git")).expect("create .git");
    write_file(
        git_root.join(CONFIG_FILE_NAME),
        r#"
[editor]
padding = true
match_mode = "regex"

[syntax]
start = "<!-- begin {name} -->"
end = "<!-- end {name} -->"
"#,
    );

    let docs = git_root.join("docs");
    fs::create_dir(&docs).expect("create docs");
    write_file(
        docs.join(CONFIG_FILE_NAME),
        r#"
[editor]
padding = false
"#,
    );

    let override_path = git_root.join("override.toml");
    write_file(
        &override_path,
        r#"
[syntax]
end = "<!-- /{name} -->"
"#,
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&docs)
            .with_override_path(&override_path),
    )
    .expect("load layered config");

    assert!(!config.editor.padding);
    assert_eq!(config.editor.match_mode, MatchMode::Regex);
    assert_eq!(config.syntax.start, "<!-- begin {name} -->");
    assert_eq!(config.syntax.end, "<!-- /{name} -->");

    let kinds: Vec<_> = config.sources.layers.iter().map(|layer| layer.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local,
            ConfigSourceKind::Override,
        ]
    );
}

#[test]
fn missing_override_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(temp.path())
            .with_override_path("missing.toml"),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::OverrideNotFound { .. }));
}

#[test]
fn unknown_keys_fail_to_parse() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(CONFIG_FILE_NAME),
        "[editor]\npaddin = true\n",
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn validation_errors_name_the_layer() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(CONFIG_FILE_NAME),
        "[syntax]\nstart = \"BEGIN\"\n",
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path())).unwrap_err();
    let ConfigError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.iter().count(), 1);
    assert!(err.to_string().contains("syntax.start"));
    assert!(err.to_string().contains("local config at"));
}

#[test]
fn builds_configured_editor() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(CONFIG_FILE_NAME),
        r##"
[editor]
padding = true

[syntax]
start = "# >>> {name}"
end = "# <<< {name}"
"##,
    );

    let config = Config::load(LoadOptions::default().with_working_dir(temp.path()))
        .expect("load config");
    let mut editor = config.build_editor("[deps]\n# >>> generated\n    # <<< generated\n");
    editor
        .find_and_update_section("generated", &["serde = \"1\""], None)
        .expect("update section");

    assert_eq!(
        editor.serialize(),
        "[deps]\n# >>> generated\n\n    serde = \"1\"\n\n    # <<< generated\n"
    );

    let options = config.edit_options();
    assert!(options.editor.padding);
    assert_eq!(options.syntax.start, "# >>> {name}");
    assert!(options.backup);
}
