use bldrx::templating::Metadata;
use bldrx::validate::manifest::TemplateManifest;

use crate::common::{TemplateFixture, TestEnvironment};

#[test]
fn test_validate_reports_each_problem_kind() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(
        &TemplateFixture::new("mixed")
            .file("README.md.j2", "# {{ project_name }} by {{ author_name }}\n")
            .file("broken.txt.j2", "{% for item in %}{% endfor %}")
            .file("LICENSE", "MIT\n"),
    )
    .unwrap();

    let mut metadata = Metadata::new();
    metadata.insert("project_name".to_string(), "demo".to_string());
    let report = env.engine().validate("mixed", &metadata, None).unwrap();

    assert!(report.syntax_errors.contains_key("broken.txt.j2"));
    assert!(report.undefined_variables["README.md.j2"].contains("author_name"));
    assert!(!report.undefined_variables["README.md.j2"].contains("project_name"));
    assert!(report.missing_files.is_empty());
    assert!(report.recommendations.is_empty());
    assert!(report.has_errors(false));
}

#[test]
fn test_strict_mode_escalates_undefined_variables() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(
        &TemplateFixture::new("loose").file("a.txt.j2", "{{ missing_one }} {{ year }}"),
    )
    .unwrap();

    let report = env.engine().validate("loose", &Metadata::new(), None).unwrap();
    let undefined: Vec<_> = report.undefined_variables["a.txt.j2"].iter().cloned().collect();
    assert_eq!(undefined, vec!["missing_one".to_string()]);
    assert!(!report.has_errors(false));
    assert!(report.has_errors(true));
}

#[test]
fn test_verify_detects_tampering_after_manifest_generation() {
    let env = TestEnvironment::new().unwrap();
    let root = env.add_packaged(&TemplateFixture::basic("py")).unwrap();

    let source = env.engine().resolve("py", None).unwrap();
    let manifest = TemplateManifest::generate(&source).unwrap();
    std::fs::write(
        root.join("bldrx-manifest.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
    assert!(env.engine().verify("py", None).unwrap().ok());

    std::fs::write(root.join(".editorconfig"), "root = false\n").unwrap();
    let report = env.engine().verify("py", None).unwrap();
    assert!(!report.ok());
    assert_eq!(report.mismatched.len(), 1);
    assert_eq!(report.mismatched[0].path, ".editorconfig");
}
