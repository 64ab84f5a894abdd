use bldrx::apply::ApplyRequest;
use bldrx::core::{Action, ActionResult, BldrxError};
use bldrx::merge::MergeStrategy;
use chrono::Datelike;
use std::fs;

use crate::common::{FileAssert, TemplateFixture, TestEnvironment, TestGit, snapshot_tree};

fn env_with(fixture: &TemplateFixture) -> TestEnvironment {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(fixture).unwrap();
    env
}

fn request(env: &TestEnvironment, template: &str) -> ApplyRequest {
    ApplyRequest::new(template, &env.project_dir)
        .meta("project_name", "demo")
        .meta("author_name", "Ada")
}

fn run(env: &TestEnvironment, request: ApplyRequest) -> Vec<ActionResult> {
    env.engine().apply(request).unwrap().collect::<anyhow::Result<Vec<_>>>().unwrap()
}

fn actions(results: &[ActionResult]) -> Vec<(String, Action)> {
    results
        .iter()
        .map(|r| (r.path.file_name().unwrap().to_string_lossy().into_owned(), r.action))
        .collect()
}

#[test]
fn test_render_skip_append_end_to_end() {
    let env = env_with(&TemplateFixture::basic("py"));

    let first = run(&env, request(&env, "py"));
    assert_eq!(
        actions(&first),
        vec![
            (".editorconfig".to_string(), Action::Copied),
            ("README.md".to_string(), Action::Rendered),
            ("main.py".to_string(), Action::Rendered),
        ]
    );
    let year = chrono::Local::now().year();
    FileAssert::contains(env.project_path("README.md"), &format!("# demo\n\nBy Ada, {year}"));
    FileAssert::contains(env.project_path("src/main.py"), "print(\"demo\")");
    FileAssert::equals(env.project_path(".editorconfig"), "root = true\n");

    let second = run(&env, request(&env, "py"));
    assert!(second.iter().all(|r| r.action == Action::Skipped), "{second:?}");

    let third = run(&env, request(&env, "py").merge_strategy(MergeStrategy::Append));
    assert_eq!(
        actions(&third),
        vec![
            (".editorconfig".to_string(), Action::Skipped),
            ("README.md".to_string(), Action::Rendered),
            ("main.py".to_string(), Action::Rendered),
        ]
    );
    let readme = env.read_project_file("README.md").unwrap();
    assert_eq!(readme.matches("# demo").count(), 2, "{readme}");
    FileAssert::equals(env.project_path(".editorconfig"), "root = true\n");
}

#[test]
fn test_results_are_yielded_lazily() {
    let env = env_with(&TemplateFixture::basic("py"));
    let mut run = env.engine().apply(request(&env, "py")).unwrap();

    let first = run.next().unwrap().unwrap();
    assert_eq!(first.action, Action::Copied);
    assert!(env.project_file_exists(".editorconfig"));
    assert!(!env.project_file_exists("README.md"));

    assert_eq!(run.by_ref().count(), 2);
    assert!(run.next().is_none());
}

#[test]
fn test_force_is_idempotent() {
    let env = env_with(&TemplateFixture::basic("py"));

    run(&env, request(&env, "py").force(true));
    let once = snapshot_tree(&env.project_dir);
    let again = run(&env, request(&env, "py").force(true));
    let twice = snapshot_tree(&env.project_dir);

    assert_eq!(once, twice);
    assert!(again.iter().all(|r| r.action.is_write()));
}

#[test]
fn test_dry_run_is_pure() {
    let env = env_with(
        &TemplateFixture::basic("py")
            .bytes("logo.bin", b"PNG\0\x01\x02")
            .dir("empty-dir"),
    );
    env.write_project_file("README.md", "existing\n").unwrap();
    let before = snapshot_tree(&env.project_dir);

    let results = run(&env, request(&env, "py").dry_run(true).backup(true).atomic(true));

    assert_eq!(snapshot_tree(&env.project_dir), before);
    assert!(!env.project_file_exists("empty-dir"));
    assert!(!env.project_file_exists(".bldrx"));
    assert_eq!(
        actions(&results),
        vec![
            (".editorconfig".to_string(), Action::WouldCopy),
            ("README.md".to_string(), Action::Skipped),
            ("logo.bin".to_string(), Action::WouldSkipBinary),
            ("main.py".to_string(), Action::WouldRender),
        ]
    );
}

#[test]
fn test_dry_run_surfaces_render_errors() {
    let env = env_with(&TemplateFixture::new("bad").file("broken.txt.j2", "{% if %}"));
    let err = env
        .engine()
        .apply(request(&env, "bad").dry_run(true))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BldrxError>(),
        Some(BldrxError::RenderSyntaxError { .. })
    ));
}

#[test]
fn test_large_file_threshold() {
    let big = vec![b'a'; 1_000_001];
    let limit = vec![b'b'; 1_000_000];
    let env = env_with(
        &TemplateFixture::new("assets").bytes("big.txt", &big).bytes("limit.txt", &limit),
    );

    let results = run(&env, request(&env, "assets"));
    assert_eq!(
        actions(&results),
        vec![
            ("big.txt".to_string(), Action::SkippedLarge),
            ("limit.txt".to_string(), Action::Copied),
        ]
    );
    assert!(!env.project_file_exists("big.txt"));

    let dry = run(&env, request(&env, "assets").dry_run(true));
    assert_eq!(dry[0].action, Action::WouldSkipLarge);

    let forced = run(&env, request(&env, "assets").force(true));
    assert_eq!(forced[0].action, Action::Copied);
    assert_eq!(fs::metadata(env.project_path("big.txt")).unwrap().len(), 1_000_001);
}

#[test]
fn test_binary_file_is_skipped_unless_forced() {
    let mut payload = b"head".to_vec();
    payload.push(0);
    payload.extend_from_slice(b"tail");
    let env = env_with(&TemplateFixture::new("bin").bytes("data.dat", &payload));

    let results = run(&env, request(&env, "bin"));
    assert_eq!(results[0].action, Action::SkippedBinary);
    assert!(!env.project_file_exists("data.dat"));

    let forced = run(&env, request(&env, "bin").force(true));
    assert_eq!(forced[0].action, Action::Copied);
    assert_eq!(fs::read(env.project_path("data.dat")).unwrap(), payload);
}

#[test]
fn test_nul_after_sniff_window_is_text() {
    let mut payload = vec![b'x'; 2048];
    payload.push(0);
    let env = env_with(&TemplateFixture::new("late").bytes("late.dat", &payload));

    let results = run(&env, request(&env, "late"));
    assert_eq!(results[0].action, Action::Copied);
}

#[test]
fn test_non_utf8_renderable_is_skipped_binary() {
    let env = env_with(&TemplateFixture::new("enc").bytes("latin.txt.j2", &[0x66, 0xff, 0xfe]));

    let results = run(&env, request(&env, "enc"));
    assert_eq!(results[0].action, Action::SkippedBinary);
    assert!(!env.project_file_exists("latin.txt"));
}

#[test]
fn test_marker_merge_replaces_region_only() {
    let env = env_with(&TemplateFixture::new("docs").file("README.md.j2", "new {{ project_name }}"));
    env.write_project_file(
        "README.md",
        "intro\n<!-- start:README.md -->\nold\n<!-- end:README.md -->\noutro\n",
    )
    .unwrap();

    let results = run(&env, request(&env, "docs").merge_strategy(MergeStrategy::Marker));
    assert_eq!(results[0].action, Action::Rendered);
    FileAssert::equals(
        env.project_path("README.md"),
        "intro\n<!-- start:README.md -->new demo<!-- end:README.md -->\noutro\n",
    );
}

#[test]
fn test_marker_merge_without_markers_appends() {
    let env = env_with(&TemplateFixture::new("docs").file("README.md.j2", "new {{ project_name }}"));
    env.write_project_file("README.md", "intro\n").unwrap();

    run(&env, request(&env, "docs").merge_strategy(MergeStrategy::Marker));
    FileAssert::equals(env.project_path("README.md"), "intro\nnew demo");
}

#[test]
fn test_prepend_merge() {
    let env = env_with(&TemplateFixture::new("docs").file("NOTES.md.j2", "top {{ project_name }}\n"));
    env.write_project_file("NOTES.md", "body\n").unwrap();

    run(&env, request(&env, "docs").merge_strategy(MergeStrategy::Prepend));
    FileAssert::equals(env.project_path("NOTES.md"), "top demo\nbody\n");
}

#[test]
fn test_merge_never_applies_to_raw_files() {
    let env = env_with(&TemplateFixture::new("raw").file("LICENSE", "MIT\n"));
    env.write_project_file("LICENSE", "Apache\n").unwrap();

    let results = run(&env, request(&env, "raw").merge_strategy(MergeStrategy::Append));
    assert_eq!(results[0].action, Action::Skipped);
    FileAssert::equals(env.project_path("LICENSE"), "Apache\n");
}

#[test]
fn test_merge_into_non_utf8_output_leaves_it_untouched() {
    let env = env_with(&TemplateFixture::new("docs").file("NOTES.md.j2", "more\n"));
    let original = [0x6f, 0x6c, 0x64, 0xff, 0x0a];
    fs::write(env.project_path("NOTES.md"), original).unwrap();

    let dry = run(&env, request(&env, "docs").merge_strategy(MergeStrategy::Append).dry_run(true));
    assert_eq!(dry[0].action, Action::WouldSkipBinary);

    let results = run(&env, request(&env, "docs").merge_strategy(MergeStrategy::Append));
    assert_eq!(results[0].action, Action::SkippedBinary);
    assert_eq!(fs::read(env.project_path("NOTES.md")).unwrap(), original);
}

#[cfg(unix)]
fn env_with_escaping_symlink() -> (TestEnvironment, std::path::PathBuf) {
    let env = env_with(&TemplateFixture::new("nested").file("sub/x.txt", "x\n"));
    let outside = env.temp_dir.path().join("outside");
    fs::create_dir_all(&outside).unwrap();
    std::os::unix::fs::symlink(&outside, env.project_path("sub")).unwrap();
    (env, outside)
}

#[cfg(unix)]
fn is_unsafe_path(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|e| matches!(e.downcast_ref::<BldrxError>(), Some(BldrxError::UnsafePath { .. })))
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_cannot_redirect_writes() {
    let (env, outside) = env_with_escaping_symlink();

    let result = env
        .engine()
        .apply(request(&env, "nested"))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>();
    let err = result.unwrap_err();
    assert!(is_unsafe_path(&err), "{err:#}");
    FileAssert::not_exists(outside.join("x.txt"));
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_cannot_redirect_atomic_writes() {
    let (env, outside) = env_with_escaping_symlink();

    let result = env
        .engine()
        .apply(request(&env, "nested").atomic(true))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>();
    let err = result.unwrap_err();
    assert!(is_unsafe_path(&err), "{err:#}");
    assert_eq!(fs::read_dir(&outside).unwrap().count(), 0);
}

#[test]
fn test_backup_before_overwrite() {
    let env = env_with(&TemplateFixture::basic("py"));
    env.write_project_file("README.md", "old readme\n").unwrap();

    run(&env, request(&env, "py").force(true).backup(true));

    let backups = env.project_path(".bldrx/backups");
    let sets: Vec<_> = fs::read_dir(&backups).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(sets.len(), 1);
    let set_name = sets[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(set_name.starts_with("py-"), "{set_name}");

    FileAssert::equals(sets[0].join("README.md"), "old readme\n");
    FileAssert::not_exists(sets[0].join(".editorconfig"));
    FileAssert::contains(env.project_path("README.md"), "# demo");
}

#[test]
fn test_no_backup_set_without_overwrites() {
    let env = env_with(&TemplateFixture::basic("py"));
    run(&env, request(&env, "py").backup(true));
    assert!(!env.project_file_exists(".bldrx"));
}

#[test]
fn test_user_template_shadows_packaged() {
    let env = env_with(&TemplateFixture::new("docs").file("WHO.txt", "packaged\n"));
    env.add_user(&TemplateFixture::new("docs").file("WHO.txt", "user\n")).unwrap();

    run(&env, request(&env, "docs"));
    FileAssert::equals(env.project_path("WHO.txt"), "user\n");
}

#[test]
fn test_templates_dir_override_wins() {
    let env = env_with(&TemplateFixture::new("docs").file("WHO.txt", "packaged\n"));
    let override_root = env.temp_dir.path().join("override");
    TemplateFixture::new("docs").file("WHO.txt", "override\n").write_to(&override_root).unwrap();

    run(&env, request(&env, "docs").templates_dir(Some(override_root)));
    FileAssert::equals(env.project_path("WHO.txt"), "override\n");
}

#[test]
fn test_missing_template_fails_before_writing() {
    let env = TestEnvironment::new().unwrap();
    let err = env.engine().apply(request(&env, "nope")).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<BldrxError>(),
        Some(BldrxError::TemplateNotFound { .. })
    ));
    assert!(env.project_files().unwrap().is_empty());
}

#[test]
fn test_manifest_file_is_not_applied() {
    let env = env_with(
        &TemplateFixture::new("signed")
            .file("a.txt", "a\n")
            .file("bldrx-manifest.json", "{\"files\": {}}"),
    );

    let results = run(&env, request(&env, "signed"));
    assert_eq!(results.len(), 1);
    assert_eq!(env.project_files().unwrap(), vec!["a.txt".to_string()]);
}

#[tokio::test]
async fn test_git_commit_after_apply() {
    if !bldrx::git::is_git_installed() {
        return;
    }
    let env = env_with(&TemplateFixture::basic("py"));
    let git = TestGit::new(&env.project_dir);
    git.init().unwrap();

    let run = env
        .engine()
        .apply(
            request(&env, "py")
                .commit_to_vcs(true)
                .commit_message(Some("chore: scaffold".to_string())),
        )
        .unwrap();
    let outcome = run.finish().await.unwrap();

    assert!(outcome.committed);
    assert_eq!(outcome.writes, 3);
    assert_eq!(git.commit_count().unwrap(), 1);
    assert_eq!(git.last_commit_message().unwrap(), "chore: scaffold");
    assert!(git.status_porcelain().unwrap().trim().is_empty());

    // Nothing new is written, so no second commit
    let again = env.engine().apply(request(&env, "py").commit_to_vcs(true)).unwrap();
    let outcome = again.finish().await.unwrap();
    assert!(!outcome.committed);
    assert_eq!(git.commit_count().unwrap(), 1);
}

#[tokio::test]
async fn test_git_commit_outside_repository_fails() {
    let env = env_with(&TemplateFixture::basic("py"));
    let run = env.engine().apply(request(&env, "py").commit_to_vcs(true)).unwrap();

    let err = run.finish().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BldrxError>(),
        Some(BldrxError::VcsIntegrationFailure { .. })
    ));
    // The files themselves were applied
    assert!(env.project_file_exists("README.md"));
}
