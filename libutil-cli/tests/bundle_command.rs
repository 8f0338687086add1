use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn touch(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "src/b.ts", "");
    touch(tmp.path(), "src/a.ts", "");
    touch(tmp.path(), "src/_private.ts", "");
    touch(
        tmp.path(),
        "index.tera",
        "{% for f in files %}export * from \"{{ f.importPath }}\";\n{% endfor %}",
    );
    touch(
        tmp.path(),
        "file-bundler.toml",
        "[src]\ntemplate = \"index.tera\"\noutfile = \"src/index.ts\"\n",
    );
    tmp
}

#[test]
fn default_config_in_cwd_is_used() {
    let tmp = project();

    Command::cargo_bin("file-bundler")
        .unwrap()
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("src (2 files)"));

    let out = fs::read_to_string(tmp.path().join("src/index.ts")).unwrap();
    assert_eq!(out, "export * from \"./a\";\nexport * from \"./b\";\n");
}

#[test]
fn second_run_reports_unchanged() {
    let tmp = project();
    let run = || {
        Command::cargo_bin("file-bundler")
            .unwrap()
            .current_dir(tmp.path())
            .assert()
            .success()
    };

    run().stdout(predicate::str::contains("unchanged").not());
    run().stdout(predicate::str::contains("unchanged"));
}

#[test]
fn explicit_config_path_is_resolved_against_cwd() {
    let tmp = project();
    let nested = tmp.path().join("conf");
    fs::create_dir_all(&nested).unwrap();
    fs::rename(
        tmp.path().join("file-bundler.toml"),
        tmp.path().join("bundle.toml"),
    )
    .unwrap();

    Command::cargo_bin("file-bundler")
        .unwrap()
        .current_dir(&nested)
        .args(["--config", "../bundle.toml"])
        .assert()
        .success();

    assert!(tmp.path().join("src/index.ts").is_file());
}

#[test]
fn missing_config_fails_with_path_in_message() {
    let tmp = TempDir::new().unwrap();

    Command::cargo_bin("file-bundler")
        .unwrap()
        .current_dir(tmp.path())
        .args(["-c", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn render_error_exits_non_zero() {
    let tmp = project();
    touch(tmp.path(), "index.tera", "{% for f in files %}");

    Command::cargo_bin("file-bundler")
        .unwrap()
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bundling failed"));

    assert!(!tmp.path().join("src/index.ts").exists());
}
