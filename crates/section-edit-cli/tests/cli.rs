use std::fs;
use std::path::PathBuf;

use predicates::prelude::*;
use section_edit_core::ExitCode;
use tempfile::{tempdir, TempDir};

fn cargo_bin() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("section-edit").unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn copy_fixture() -> (TempDir, PathBuf) {
    let temp_dir = tempdir().unwrap();
    let target = temp_dir.path().join("doc.md");
    fs::copy(fixture_path("sample.md"), &target).unwrap();
    (temp_dir, target)
}

#[test]
fn replace_dry_run_prints_diff() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("replace")
        .arg("toc")
        .arg("--with-string")
        .arg("- [Sample](#sample)\\n- [Items](#items)")
        .arg("--dry-run");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("-- [Old](#old)"))
        .stdout(predicate::str::contains("+- [Items](#items)"));

    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        fs::read_to_string(fixture_path("sample.md")).unwrap()
    );
}

#[test]
fn append_writes_indented_content_and_backup() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("append")
        .arg("items")
        .arg("--with-string")
        .arg("- beta\\n")
        .arg("-q");

    cmd.assert().success().stdout(predicate::str::is_empty());

    let updated = fs::read_to_string(&target).unwrap();
    assert!(updated.contains("  <-- items\n  - alpha\n  - beta\n  --> items\n"));
    assert!(temp_dir.path().join("doc.md.bak").exists());
}

#[test]
fn prepend_reads_payload_from_stdin_without_backup() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("prepend")
        .arg("items")
        .arg("--with")
        .arg("-")
        .arg("--no-backup")
        .write_stdin("- zero\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let updated = fs::read_to_string(&target).unwrap();
    assert!(updated.contains("  <-- items\n  - zero\n  - alpha\n"));
    assert!(!temp_dir.path().join("doc.md.bak").exists());
}

#[test]
fn show_prints_interior_lines() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("show")
        .arg("toc");

    cmd.assert()
        .success()
        .stdout(predicate::eq("- [Old](#old)\n"));
}

#[test]
fn replace_requires_payload() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("replace")
        .arg("toc");

    cmd.assert()
        .failure()
        .code(ExitCode::InvalidArguments as i32)
        .stderr(predicate::str::contains("requires --with"));
}

#[test]
fn missing_section_lists_known_sections() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("append")
        .arg("missing")
        .arg("--with-string")
        .arg("- x");

    cmd.assert()
        .failure()
        .code(ExitCode::NotFound as i32)
        .stderr(predicate::str::contains("Known sections"))
        .stderr(predicate::str::contains("  - toc"))
        .stderr(predicate::str::contains("  - items"));
}

#[test]
fn config_file_supplies_syntax_and_padding() {
    let temp_dir = tempdir().unwrap();
    let target = temp_dir.path().join("Cargo.toml");
    fs::write(&target, "[dependencies]\n# begin deps\n# end deps\n").unwrap();
    fs::write(
        temp_dir.path().join(".section-edit.toml"),
        "[editor]\npadding = true\n\n[syntax]\nstart = \"# begin {name}\"\nend = \"# end {name}\"\n",
    )
    .unwrap();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("replace")
        .arg("deps")
        .arg("--with-string")
        .arg("log = \\\"0.4\\\"")
        .arg("--no-backup")
        .arg("-q");

    cmd.assert().success();
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "[dependencies]\n# begin deps\n\nlog = \"0.4\"\n\n# end deps\n"
    );
}

#[test]
fn template_flags_require_placeholder() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("show")
        .arg("toc")
        .arg("--start")
        .arg("<!-- begin -->");

    cmd.assert()
        .failure()
        .code(ExitCode::InvalidArguments as i32)
        .stderr(predicate::str::contains("must contain {name}"));
}

#[test]
fn invalid_regex_pattern_has_its_own_exit_code() {
    let (temp_dir, target) = copy_fixture();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp_dir.path())
        .arg(&target)
        .arg("show")
        .arg("(")
        .arg("--regex");

    cmd.assert()
        .failure()
        .code(ExitCode::InvalidPattern as i32)
        .stderr(predicate::str::contains("Invalid sentinel pattern"));
}
