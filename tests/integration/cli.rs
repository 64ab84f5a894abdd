use predicates::prelude::*;
use std::fs;

use crate::common::{CliProject, FileAssert, TemplateFixture};

fn docs() -> TemplateFixture {
    TemplateFixture::new("docs")
        .file("README.md.j2", "# {{ project_name }}\nby {{ author_name }}\n")
        .file("LICENSE", "MIT\n")
}

#[test]
fn test_list_json_and_origins() {
    let project = CliProject::new()
        .with_packaged(&docs())
        .with_user(&TemplateFixture::new("ci").file("ci.yml", "on: push\n"));

    project
        .bldrx()
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"["ci","docs"]"#));

    project
        .bldrx()
        .args(["list", "--details"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ci (user)"))
        .stdout(predicate::str::contains("- README.md.j2"));
}

#[test]
fn test_new_scaffolds_project() {
    let project = CliProject::new().with_packaged(&docs());

    project
        .bldrx()
        .args(["new", "demo", "--templates", "docs", "--author", "Ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applying template: docs"))
        .stdout(predicate::str::contains("rendered:"))
        .stdout(predicate::str::contains("Done."));

    FileAssert::contains(project.root().join("demo/README.md"), "# demo\nby Ada");
    FileAssert::equals(project.root().join("demo/LICENSE"), "MIT\n");
}

#[test]
fn test_new_refuses_existing_destination() {
    let project = CliProject::new().with_packaged(&docs());
    fs::create_dir_all(project.root().join("demo")).unwrap();

    project
        .bldrx()
        .args(["new", "demo", "--templates", "docs"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_add_dry_run_writes_nothing() {
    let project = CliProject::new().with_packaged(&docs());

    project
        .bldrx()
        .arg("add")
        .arg(project.project_path())
        .args(["--templates", "docs", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would-render:"))
        .stdout(predicate::str::contains("would-copy:"));

    assert!(project.env.project_files().unwrap().is_empty());
}

#[test]
fn test_add_with_meta_and_merge() {
    let project = CliProject::new().with_packaged(&docs());
    project.env.write_project_file("README.md", "existing\n").unwrap();

    project
        .bldrx()
        .arg("add")
        .arg(project.project_path())
        .args(["--templates", "docs", "--merge", "append", "--meta", "author_name=Grace"])
        .assert()
        .success();

    let readme = project.env.read_project_file("README.md").unwrap();
    assert!(readme.starts_with("existing\n# project\nby Grace"), "{readme}");
}

#[test]
fn test_add_unknown_template_fails() {
    let project = CliProject::new();

    project
        .bldrx()
        .arg("add")
        .arg(project.project_path())
        .args(["--templates", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Template 'nope' not found"));
}

#[test]
fn test_remove_requires_confirmation() {
    let project = CliProject::new().with_packaged(&docs());
    project.env.write_project_file("LICENSE", "MIT\n").unwrap();

    project
        .bldrx()
        .arg("remove")
        .arg(project.project_path())
        .arg("docs")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force, --yes or --dry-run"));

    project
        .bldrx()
        .arg("remove")
        .arg(project.project_path())
        .args(["docs", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would-remove:"))
        .stdout(predicate::str::contains("missing:"));
    FileAssert::exists(project.env.project_path("LICENSE"));

    project
        .bldrx()
        .arg("remove")
        .arg(project.project_path())
        .args(["docs", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed:"));
    FileAssert::not_exists(project.env.project_path("LICENSE"));
}

#[test]
fn test_install_and_uninstall() {
    let project = CliProject::new();
    let src = project.root().join("my-template");
    TemplateFixture::new("my-template")
        .file("hello.txt", "hi\n")
        .write_to(&project.root())
        .unwrap();

    project
        .bldrx()
        .arg("install")
        .arg(&src)
        .args(["--name", "greeting"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed template to:"));
    FileAssert::exists(project.env.user_root.join("greeting/hello.txt"));

    project
        .bldrx()
        .arg("install")
        .arg(&src)
        .args(["--name", "greeting"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    project
        .bldrx()
        .args(["uninstall", "greeting"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--yes"));

    project.bldrx().args(["uninstall", "greeting", "--yes"]).assert().success();
    FileAssert::not_exists(project.env.user_root.join("greeting"));
}

#[test]
fn test_preview_render_single_file() {
    let project = CliProject::new().with_packaged(&docs());

    project
        .bldrx()
        .args(["preview", "docs", "--file", "README.md.j2", "--render"])
        .args(["--meta", "project_name=demo", "--meta", "author_name=Ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# demo\nby Ada"));

    project
        .bldrx()
        .args(["preview", "docs", "--file", "README.md.j2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{{ project_name }}"));

    project
        .bldrx()
        .args(["preview", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- LICENSE"));
}

#[test]
fn test_preview_diff_json() {
    let project = CliProject::new().with_packaged(&docs());

    let output = project
        .bldrx()
        .args(["preview", "docs", "--render", "--diff", "--json", "--dest"])
        .arg(project.project_path())
        .args(["--meta", "project_name=demo"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "would-copy");
    assert_eq!(entries[1]["action"], "would-render");
    assert!(entries[1]["diff"].as_str().unwrap().contains("+# demo"));
    assert!(project.env.project_files().unwrap().is_empty());
}

#[test]
fn test_validate_exit_codes() {
    let project = CliProject::new().with_packaged(&docs());

    project
        .bldrx()
        .args(["validate", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ docs"));

    project
        .bldrx()
        .args(["validate", "docs", "--strict"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("undefined variables in README.md.j2"));

    project
        .bldrx()
        .args(["validate", "docs", "--strict", "--meta", "project_name=a", "--meta", "author_name=b"])
        .assert()
        .success();
}

#[test]
fn test_validate_all_templates_json() {
    let project = CliProject::new()
        .with_packaged(&docs())
        .with_packaged(&TemplateFixture::new("broken").file("x.txt.j2", "{% if %}"));

    let output = project.bldrx().args(["validate", "--json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["ok"], false);
    let templates = summary["templates"].as_array().unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0]["template"], "broken");
    assert_eq!(templates[0]["ok"], false);
    assert!(templates[0]["syntax_errors"]["x.txt.j2"].is_string());
    assert_eq!(templates[1]["ok"], true);
}

#[test]
fn test_verify_generate_then_detect_tampering() {
    let project = CliProject::new().with_packaged(&docs());

    project.bldrx().args(["verify", "docs", "--generate"]).assert().success();
    FileAssert::exists(project.env.packaged_root.join("docs/bldrx-manifest.json"));

    project
        .bldrx()
        .args(["verify", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matches its manifest"));

    fs::write(project.env.packaged_root.join("docs/LICENSE"), "GPL\n").unwrap();
    project
        .bldrx()
        .args(["verify", "docs"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("mismatch: LICENSE"));
}

#[test]
fn test_config_file_sets_user_templates_dir() {
    let project = CliProject::new();
    let custom = project.root().join("custom-user");
    TemplateFixture::new("from-config").file("a.txt", "a\n").write_to(&custom).unwrap();
    let config = project.root().join("bldrx.toml");
    fs::write(&config, format!("user_templates_dir = {:?}\n", custom.display().to_string()))
        .unwrap();

    project
        .bldrx()
        .env_remove("BLDRX_TEMPLATES_DIR")
        .arg("--config")
        .arg(&config)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-config"));
}
