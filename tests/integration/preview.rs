use bldrx::apply::{ApplyRequest, PreviewEntry};
use bldrx::core::Action;
use bldrx::templating::Metadata;

use crate::common::{TemplateFixture, TestEnvironment, snapshot_tree};

fn metadata() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("project_name".to_string(), "demo".to_string());
    metadata.insert("author_name".to_string(), "Ada".to_string());
    metadata
}

fn preview(env: &TestEnvironment, with_diff: bool) -> Vec<PreviewEntry> {
    env.engine()
        .preview("py", &env.project_dir, metadata(), with_diff, None)
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap()
}

#[test]
fn test_preview_against_empty_project() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(&TemplateFixture::basic("py")).unwrap();

    let entries = preview(&env, true);
    let actions: Vec<Action> = entries.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![Action::WouldCopy, Action::WouldRender, Action::WouldRender]);

    let readme = &entries[1];
    let diff = readme.diff.as_deref().unwrap();
    assert!(diff.contains("--- (empty)"), "{diff}");
    assert!(diff.contains("+# demo"), "{diff}");
    assert!(env.project_files().unwrap().is_empty());
}

#[test]
fn test_preview_after_apply_is_all_skipped() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(&TemplateFixture::basic("py")).unwrap();

    let request = ApplyRequest::new("py", &env.project_dir).metadata(metadata());
    for result in env.engine().apply(request).unwrap() {
        result.unwrap();
    }

    let entries = preview(&env, true);
    assert!(entries.iter().all(|e| e.action == Action::Skipped), "{entries:?}");
    assert!(entries.iter().all(|e| e.diff.is_none()));
}

#[test]
fn test_preview_diff_of_changed_file() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(
        &TemplateFixture::new("py").file("NOTES.md.j2", "one\n{{ project_name }}\nthree\n"),
    )
    .unwrap();
    env.write_project_file("NOTES.md", "one\ntwo\nthree\n").unwrap();
    let before = snapshot_tree(&env.project_dir);

    let entries = preview(&env, true);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, Action::WouldRender);
    let diff = entries[0].diff.as_deref().unwrap();
    assert!(diff.contains("-two"), "{diff}");
    assert!(diff.contains("+demo"), "{diff}");
    assert!(diff.contains("@@"), "{diff}");

    assert_eq!(snapshot_tree(&env.project_dir), before);
}

#[test]
fn test_preview_without_diff() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(&TemplateFixture::basic("py")).unwrap();

    let entries = preview(&env, false);
    assert!(entries.iter().all(|e| e.diff.is_none()));
}

#[test]
fn test_preview_serializes_for_automation() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(&TemplateFixture::new("py").file("a.txt", "a\n")).unwrap();

    let json = serde_json::to_value(preview(&env, true)).unwrap();
    assert_eq!(json[0]["action"], "would-copy");
    assert!(json[0]["path"].as_str().unwrap().ends_with("a.txt"));
    assert!(json[0]["diff"].as_str().is_some());
}

#[test]
fn test_render_single_template_file() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(&TemplateFixture::basic("py")).unwrap();

    let rendered = env
        .engine()
        .render_template_file("py", "src/main.py.j2", &metadata(), None)
        .unwrap();
    assert!(rendered.starts_with("print(\"demo\")"));
}
