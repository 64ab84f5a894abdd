use bldrx::apply::ApplyRequest;
use bldrx::core::{Action, BldrxError};
use std::fs;

use crate::common::{FileAssert, TemplateFixture, TestEnvironment, snapshot_entries, snapshot_tree};

/// Three raw files; the third output path is occupied by a directory so its
/// write fails after the first two succeeded.
fn setup() -> TestEnvironment {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(
        &TemplateFixture::new("trio")
            .file("a.txt", "new a\n")
            .file("b.txt", "new b\n")
            .file("c.txt", "new c\n"),
    )
    .unwrap();
    env.write_project_file("a.txt", "old a\n").unwrap();
    fs::create_dir_all(env.project_path("c.txt")).unwrap();
    env
}

fn request(env: &TestEnvironment) -> ApplyRequest {
    ApplyRequest::new("trio", &env.project_dir).force(true)
}

#[test]
fn test_atomic_failure_restores_everything() {
    let env = setup();
    let before = snapshot_tree(&env.project_dir);

    let mut run = env.engine().apply(request(&env).atomic(true)).unwrap();
    assert_eq!(run.next().unwrap().unwrap().action, Action::Copied);
    assert_eq!(run.next().unwrap().unwrap().action, Action::Copied);

    let err = run.next().unwrap().unwrap_err();
    assert!(run.next().is_none());
    match err.downcast_ref::<BldrxError>() {
        Some(BldrxError::AtomicTransactionFailure {
            path,
            ..
        }) => assert!(path.ends_with("c.txt"), "{path}"),
        other => panic!("unexpected error: {other:?}"),
    }

    FileAssert::equals(env.project_path("a.txt"), "old a\n");
    FileAssert::not_exists(env.project_path("b.txt"));
    assert!(env.project_path("c.txt").is_dir());
    assert_eq!(snapshot_tree(&env.project_dir), before);
}

#[test]
fn test_atomic_rollback_leaves_no_snapshots() {
    let env = setup();
    let _ = env
        .engine()
        .apply(request(&env).atomic(true))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>();

    let leftovers: Vec<_> = fs::read_dir(&env.project_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("bldrx-rollback"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn test_atomic_rollback_with_backup() {
    let env = setup();
    let before_entries = snapshot_entries(&env.project_dir);
    let before = snapshot_tree(&env.project_dir);

    let result = env
        .engine()
        .apply(request(&env).atomic(true).backup(true))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>();
    assert!(result.is_err());

    FileAssert::equals(env.project_path("a.txt"), "old a\n");
    FileAssert::not_exists(env.project_path("b.txt"));
    FileAssert::not_exists(env.project_path(".bldrx"));
    assert_eq!(snapshot_entries(&env.project_dir), before_entries);
    assert_eq!(snapshot_tree(&env.project_dir), before);
}

#[test]
fn test_atomic_rollback_keeps_earlier_backup_sets() {
    let env = setup();
    fs::create_dir_all(env.project_path(".bldrx/backups/trio-19990101000000")).unwrap();
    fs::write(env.project_path(".bldrx/backups/trio-19990101000000/a.txt"), "ancient\n").unwrap();
    let before_entries = snapshot_entries(&env.project_dir);

    let result = env
        .engine()
        .apply(request(&env).atomic(true).backup(true))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>();
    assert!(result.is_err());

    assert_eq!(snapshot_entries(&env.project_dir), before_entries);
}

#[test]
fn test_atomic_rollback_removes_created_directories() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(
        &TemplateFixture::new("nested").file("docs/guide/intro.md", "hi\n").file("z.txt", "z\n"),
    )
    .unwrap();
    fs::create_dir_all(env.project_path("z.txt")).unwrap();

    let result = env
        .engine()
        .apply(ApplyRequest::new("nested", &env.project_dir).force(true).atomic(true))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>();
    assert!(result.is_err());

    FileAssert::not_exists(env.project_path("docs"));
    assert!(env.project_path("z.txt").is_dir());
}

#[test]
fn test_direct_mode_keeps_earlier_writes() {
    let env = setup();
    let result = env
        .engine()
        .apply(request(&env))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>();
    assert!(result.is_err());

    FileAssert::equals(env.project_path("a.txt"), "new a\n");
    FileAssert::equals(env.project_path("b.txt"), "new b\n");
}

#[test]
fn test_atomic_success_commits_and_cleans_up() {
    let env = TestEnvironment::new().unwrap();
    env.add_packaged(&TemplateFixture::new("trio").file("a.txt", "new a\n")).unwrap();
    env.write_project_file("a.txt", "old a\n").unwrap();

    let results = env
        .engine()
        .apply(ApplyRequest::new("trio", &env.project_dir).force(true).atomic(true))
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(results.len(), 1);
    FileAssert::equals(env.project_path("a.txt"), "new a\n");
    assert_eq!(env.project_files().unwrap(), vec!["a.txt".to_string()]);
}
