// # Engine scenario tests
//
// End-to-end checks of navigation, search and transfers against real
// temporary directory trees.

use explorer_fs::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use walkdir::WalkDir;

fn dir_loc(path: &Path) -> Location {
    Location::from_path(path)
}

/// Relative path -> contents (None for folders), sorted.
fn snapshot(root: &Path) -> Vec<(PathBuf, Option<String>)> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            let contents = entry
                .file_type()
                .is_file()
                .then(|| fs::read_to_string(entry.path()).unwrap());
            (relative, contents)
        })
        .collect()
}

#[test]
fn test_history_scenario() {
    let temp = TempDir::new().unwrap();
    for name in ["A", "B", "C", "D"] {
        fs::create_dir(temp.path().join(name)).unwrap();
    }
    let a = dir_loc(&temp.path().join("A"));
    let mut nav = NavigationController::default().starting_at(a.clone());
    for name in ["B", "C"] {
        nav.navigate(temp.path().join(name).to_str().unwrap()).unwrap();
    }
    assert_eq!(nav.back_stack(), &[a.clone(), dir_loc(&temp.path().join("B"))]);

    nav.go_back().unwrap();
    nav.go_back().unwrap();
    nav.navigate(temp.path().join("D").to_str().unwrap()).unwrap();

    assert!(nav.forward_stack().is_empty());
    assert_eq!(nav.back_stack(), &[a]);
    assert_eq!(nav.current(), &dir_loc(&temp.path().join("D")));
}

#[test]
fn test_back_forward_move_one_entry() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("x")).unwrap();
    fs::create_dir(temp.path().join("y")).unwrap();
    let mut nav = NavigationController::default();
    nav.navigate_to(dir_loc(&temp.path().join("x"))).unwrap();
    nav.navigate_to(dir_loc(&temp.path().join("y"))).unwrap();

    assert_eq!(nav.go_back(), Ok(true));
    assert_eq!(nav.forward_stack(), &[dir_loc(&temp.path().join("y"))]);
    assert_eq!(nav.go_forward(), Ok(true));
    assert!(nav.forward_stack().is_empty());
    assert_eq!(nav.back_stack().len(), 2);
}

#[test]
fn test_paste_rename_scenario() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.txt");
    fs::write(&report, "q3").unwrap();
    let engine = TransferEngine::without_trash();
    let mut prompts = Vec::new();
    let mut resolver = |conflict: &Conflict| {
        prompts.push(conflict.destination.clone());
        ConflictChoice::Rename
    };

    let first = engine.copy_items(&[report.clone()], &dir_loc(temp.path()), &mut resolver);
    let second = engine.copy_items(&[report.clone()], &dir_loc(temp.path()), &mut resolver);

    assert_eq!(first[0].outcome, Outcome::Copied(temp.path().join("report_1.txt")));
    assert_eq!(second[0].outcome, Outcome::Copied(temp.path().join("report_2.txt")));
    assert_eq!(prompts, vec![report.clone(), report]);
    assert_eq!(fs::read_to_string(temp.path().join("report_2.txt")).unwrap(), "q3");
}

#[test]
fn test_move_into_own_parent_is_noop() {
    let temp = TempDir::new().unwrap();
    let x = temp.path().join("x.txt");
    fs::write(&x, "stay").unwrap();

    let outcomes = TransferEngine::without_trash().move_items(
        &[x.clone()],
        &dir_loc(temp.path()),
        &mut Always(ConflictChoice::Overwrite),
    );

    assert_eq!(outcomes[0].outcome, Outcome::Unchanged(NoOp::SameLocation));
    assert!(outcomes[0].outcome.is_success());
    assert_eq!(fs::read_to_string(&x).unwrap(), "stay");
}

#[test]
fn test_search_scenario() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("access.log"), "").unwrap();
    fs::create_dir(temp.path().join("logs")).unwrap();
    fs::write(temp.path().join("logs/app.log"), "").unwrap();
    fs::write(temp.path().join("notes.txt"), "").unwrap();

    let results: Vec<PathBuf> = SearchEngine::default()
        .search("log", temp.path())
        .map(|r| r.path)
        .collect();

    assert_eq!(
        results,
        vec![
            temp.path().join("logs"),
            temp.path().join("logs").join("app.log"),
            temp.path().join("access.log"),
        ]
    );
}

#[test]
fn test_copy_tree_then_delete_original() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("project");
    fs::create_dir_all(src.join("src/nested")).unwrap();
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::write(src.join("Cargo.toml"), "[package]").unwrap();
    fs::write(src.join("src/lib.rs"), "pub fn a() {}").unwrap();
    fs::write(src.join("src/nested/deep.rs"), "// deep").unwrap();
    let expected = snapshot(&src);

    let dest = temp.path().join("backup");
    fs::create_dir(&dest).unwrap();
    let engine = TransferEngine::without_trash();
    let copied = engine.copy_items(&[src.clone()], &dir_loc(&dest), &mut Always(ConflictChoice::Cancel));
    assert_eq!(copied[0].outcome, Outcome::Copied(dest.join("project")));

    let deleted = engine.delete_items(&[src.clone()]);
    assert_eq!(deleted[0].outcome, Outcome::Deleted);
    assert!(!src.exists());
    assert_eq!(snapshot(&dest.join("project")), expected);
}

#[test]
fn test_move_directory_across_folders() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("album");
    fs::create_dir_all(src.join("disc1")).unwrap();
    fs::write(src.join("disc1/track.flac"), "la").unwrap();
    let dest = temp.path().join("music");
    fs::create_dir(&dest).unwrap();

    let outcomes = TransferEngine::without_trash().move_items(&[src.clone()], &dir_loc(&dest), &mut Always(ConflictChoice::Cancel));

    assert_eq!(outcomes[0].outcome, Outcome::Moved(dest.join("album")));
    assert!(!src.exists());
    assert_eq!(fs::read_to_string(dest.join("album/disc1/track.flac")).unwrap(), "la");
}

#[test]
fn test_rename_to_current_name_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("keep.md");
    fs::write(&file, "body").unwrap();
    let engine = TransferEngine::without_trash();

    for _ in 0..2 {
        assert_eq!(engine.rename(&file, "keep.md").unwrap(), file);
    }
    assert_eq!(snapshot(temp.path()), vec![(PathBuf::from("keep.md"), Some("body".to_string()))]);

    let renamed = engine.rename(&file, "kept.md").unwrap();
    assert_eq!(renamed, temp.path().join("kept.md"));
    assert!(!file.exists());
}

#[test]
fn test_invalid_names_never_touch_disk() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.txt");
    fs::write(&file, "").unwrap();
    let engine = TransferEngine::without_trash();

    for bad in ["x/y", "x*y", "", ".."] {
        assert!(matches!(engine.rename(&file, bad), Err(TransferError::InvalidName(_))));
        assert!(matches!(engine.create_directory(&dir_loc(temp.path()), bad), Err(TransferError::InvalidName(_))));
    }
    assert_eq!(snapshot(temp.path()).len(), 1);
}

#[test]
fn test_synthesized_names_never_existed() {
    let temp = TempDir::new().unwrap();
    let engine = TransferEngine::without_trash();
    let dir = dir_loc(temp.path());

    let mut created = Vec::new();
    for _ in 0..5 {
        let path = engine.create_file(&dir, "New File.txt").unwrap();
        assert!(!created.contains(&path));
        created.push(path);
    }
    assert_eq!(created[4], temp.path().join("New File_4.txt"));
}

#[test]
fn test_navigate_to_missing_path_leaves_state() {
    let temp = TempDir::new().unwrap();
    let mut nav = NavigationController::default();
    nav.navigate(temp.path().to_str().unwrap()).unwrap();

    let result = nav.navigate("definitely/not/here");
    assert!(matches!(result, Err(NavigationError::NotFound(_))));
    assert_eq!(nav.current(), &dir_loc(temp.path()));
    assert_eq!(nav.back_stack(), &[Location::CollectionRoot]);
    assert!(nav.forward_stack().is_empty());
}

#[test]
fn test_failing_trash_falls_back_to_permanent_delete() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("old");
    fs::create_dir_all(folder.join("sub")).unwrap();
    fs::write(folder.join("sub/f"), "").unwrap();

    let attempts = Arc::new(Mutex::new(0));
    let counter = attempts.clone();
    let engine = TransferEngine::new(Some(Arc::new(move |_: &Path| {
        *counter.lock().unwrap() += 1;
        false
    })));

    let outcomes = engine.delete_items(&[folder.clone(), temp.path().join("ghost")]);

    assert_eq!(outcomes[0].outcome, Outcome::Deleted);
    assert_eq!(outcomes[1].outcome, Outcome::Unchanged(NoOp::AlreadyGone));
    assert_eq!(*attempts.lock().unwrap(), 1);
    assert!(!folder.exists());
}

#[test]
fn test_recording_trash_receives_every_target() {
    let temp = TempDir::new().unwrap();
    let targets: Vec<PathBuf> = ["a", "b"].iter().map(|n| temp.path().join(n)).collect();
    for target in &targets {
        fs::write(target, "").unwrap();
    }

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let log = recorded.clone();
    let engine = TransferEngine::new(Some(Arc::new(move |p: &Path| {
        log.lock().unwrap().push(p.to_path_buf());
        fs::remove_file(p).is_ok()
    })));

    let report = BatchReport::new(BatchKind::Delete, engine.delete_items(&targets));

    assert_eq!(*recorded.lock().unwrap(), targets);
    assert!(report.items.iter().all(|i| i.outcome == Outcome::Trashed));
    assert_eq!(report.to_string(), "2 of 2 items deleted");
}

#[cfg(unix)]
#[test]
fn test_failed_overwrite_does_not_stop_the_batch() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let incoming = temp.path().join("incoming");
    let dest = temp.path().join("dest");
    fs::create_dir_all(&incoming).unwrap();
    fs::create_dir_all(dest.join("data/locked")).unwrap();
    fs::write(dest.join("data/locked/pinned.bin"), "old").unwrap();
    fs::write(incoming.join("data"), "new").unwrap();
    fs::write(incoming.join("other.txt"), "other").unwrap();

    let locked = dest.join("data/locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    // Privileged users ignore directory permissions; nothing to observe then.
    if fs::write(locked.join("probe"), "").is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let engine = TransferEngine::without_trash();
    let outcomes = engine.copy_items(
        &[incoming.join("data"), incoming.join("other.txt")],
        &dir_loc(&dest),
        &mut Always(ConflictChoice::Overwrite),
    );
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(outcomes[0].outcome, Outcome::Failed(TransferError::PermissionDenied(_))));
    assert_eq!(outcomes[1].outcome, Outcome::Copied(dest.join("other.txt")));

    let report = BatchReport::new(BatchKind::Copy, outcomes);
    assert_eq!(report.to_string(), "1 of 2 items copied; 1 failed: data (permission denied)");
}

#[test]
fn test_worker_runs_batch_in_background() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("dest");
    fs::create_dir(&dest).unwrap();
    fs::write(temp.path().join("one"), "1").unwrap();

    let worker = TransferWorker::new(TransferEngine::without_trash());
    let handle = worker
        .start(
            TransferJob::Move {
                sources: vec![temp.path().join("one")],
                destination: dir_loc(&dest),
            },
            Box::new(Always(ConflictChoice::Cancel)),
        )
        .unwrap();

    let first = handle.recv().unwrap();
    assert_eq!(first.outcome, Outcome::Moved(dest.join("one")));
    assert_eq!(handle.wait().items.len(), 0);
}
