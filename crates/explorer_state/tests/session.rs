// # ExplorerSession Tests
//
// Clipboard-mediated paste, entry action checks, and the events a renderer
// would receive, all against temporary directory trees.

use explorer_fs::*;
use explorer_state::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn session() -> (ExplorerSession, EventLog) {
    let settings = ExplorerSettings {
        use_trash: false,
        ..ExplorerSettings::default()
    };
    let log = EventLog::new();
    let session = ExplorerSession::with_pinned(settings, Vec::new()).with_events(log.clone());
    (session, log)
}

#[derive(Clone, Default)]
struct FakeTextClipboard(Arc<Mutex<Option<String>>>);

impl TextClipboard for FakeTextClipboard {
    fn set_text(&mut self, text: &str) -> bool {
        *self.0.lock().unwrap() = Some(text.to_string());
        true
    }
}

#[derive(Clone, Default)]
struct RecordingOpener(Arc<Mutex<Vec<PathBuf>>>);

impl Opener for RecordingOpener {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        self.0.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn test_cut_paste_into_own_parent_clears_clipboard() {
    let temp = TempDir::new().unwrap();
    let x = temp.path().join("x.txt");
    fs::write(&x, "here").unwrap();
    let (mut session, log) = session();
    session.navigate_to(Location::from_path(temp.path())).unwrap();

    session.cut(&[x.clone()]).unwrap();
    assert!(session.is_cut(&x));

    let report = session.paste(None, &mut Always(ConflictChoice::Overwrite)).unwrap();

    assert_eq!(report.items[0].outcome, Outcome::Unchanged(NoOp::SameLocation));
    assert_eq!(fs::read_to_string(&x).unwrap(), "here");
    assert!(session.clipboard().is_empty());
    assert!(!session.is_cut(&x));

    let events = log.drain();
    assert!(matches!(events.last(), Some(ExplorerEvent::BatchCompleted(_))));
    assert!(events.contains(&ExplorerEvent::ClipboardChanged(vec![x.clone()])));
}

#[test]
fn test_cut_paste_moves_and_empties_clipboard() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let dest = temp.path().join("dest");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dest).unwrap();
    fs::write(src.join("a.txt"), "a").unwrap();
    fs::create_dir(src.join("folder")).unwrap();
    let (mut session, _log) = session();

    session.cut(&[src.join("a.txt"), src.join("folder")]).unwrap();
    let report = session
        .paste(Some(&Location::from_path(&dest)), &mut Always(ConflictChoice::Cancel))
        .unwrap();

    assert_eq!(report.to_string(), "2 of 2 items moved");
    assert!(dest.join("a.txt").exists());
    assert!(dest.join("folder").is_dir());
    assert!(!src.join("a.txt").exists());
    assert_eq!(session.clipboard().mode(), None);
}

#[test]
fn test_failed_items_stay_on_clipboard() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("dest");
    fs::create_dir(&dest).unwrap();
    let good = temp.path().join("good.txt");
    let doomed = temp.path().join("doomed.txt");
    fs::write(&good, "").unwrap();
    fs::write(&doomed, "").unwrap();
    let (mut session, _log) = session();

    session.copy(&[good.clone(), doomed.clone()]).unwrap();
    fs::remove_file(&doomed).unwrap();
    let report = session
        .paste(Some(&Location::from_path(&dest)), &mut Always(ConflictChoice::Rename))
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(session.clipboard().entries(), &[doomed]);
    assert_eq!(session.clipboard().mode(), Some(ClipboardMode::Copy));
}

#[test]
fn test_paste_into_collection_root_is_refused() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");
    fs::write(&file, "").unwrap();
    let (mut session, _log) = session();
    session.copy(&[file.clone()]).unwrap();

    let err = session
        .paste(Some(&Location::CollectionRoot), &mut Always(ConflictChoice::Rename))
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidTarget { .. }));
    assert_eq!(session.clipboard().entries(), &[file]);
}

#[test]
fn test_volume_roots_cannot_be_cut_or_deleted() {
    let (mut session, _log) = session();
    let volume = volumes().remove(0);

    assert!(matches!(session.cut(&[volume.clone()]), Err(TransferError::InvalidTarget { .. })));
    let report = session.delete(&[volume.clone()]).unwrap();
    assert!(matches!(report.items[0].outcome, Outcome::Failed(TransferError::InvalidTarget { .. })));
    assert!(matches!(session.rename(&volume, "x"), Err(TransferError::InvalidTarget { .. })));
    assert!(session.clipboard().is_empty());
    assert!(volume.exists());
}

#[test]
fn test_refused_volume_root_does_not_stop_delete() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("stale.tmp");
    fs::write(&file, "").unwrap();
    let volume = volumes().remove(0);
    let (mut session, log) = session();

    let report = session.delete(&[file.clone(), volume.clone()]).unwrap();

    assert_eq!(report.items.len(), 2);
    assert_eq!(report.items[0].outcome, Outcome::Deleted);
    assert!(matches!(report.items[1].outcome, Outcome::Failed(TransferError::InvalidTarget { .. })));
    assert!(!file.exists());
    assert!(volume.exists());
    assert!(matches!(log.drain().last(), Some(ExplorerEvent::BatchCompleted(_))));
}

#[test]
fn test_delete_drops_paths_from_clipboard() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    fs::write(&a, "").unwrap();
    fs::write(&b, "").unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let seen = recorded.clone();
    let (session, _log) = session();
    let mut session = session.with_trash(Some(Arc::new(move |p: &Path| {
        seen.lock().unwrap().push(p.to_path_buf());
        false
    })));

    session.cut(&[a.clone(), b.clone()]).unwrap();
    let report = session.delete(&[a.clone()]).unwrap();

    assert_eq!(report.items[0].outcome, Outcome::Deleted);
    assert_eq!(*recorded.lock().unwrap(), vec![a.clone()]);
    assert_eq!(session.clipboard().entries(), &[b.clone()]);
    assert!(session.is_cut(&b));
}

#[test]
fn test_navigation_events_only_on_change() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    let (mut session, log) = session();
    let sub = Location::from_path(temp.path().join("sub"));

    session.navigate_to(sub.clone()).unwrap();
    session.navigate_to(sub.clone()).unwrap();
    assert!(session.navigate("nowhere/at/all").is_err());
    session.go_back().unwrap();

    assert_eq!(
        log.drain(),
        vec![
            ExplorerEvent::LocationChanged(sub),
            ExplorerEvent::LocationChanged(Location::CollectionRoot),
        ]
    );
}

#[test]
fn test_activate_opens_files_and_enters_folders() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("song.mp3");
    fs::write(&file, "").unwrap();
    let opener = RecordingOpener::default();
    let (session, _log) = session();
    let mut session = session.with_opener(opener.clone());

    assert_eq!(
        session.activate(temp.path()).unwrap(),
        Activation::Navigated(Location::from_path(temp.path()))
    );
    assert_eq!(session.activate(&file).unwrap(), Activation::Opened(file.clone()));
    assert_eq!(*opener.0.lock().unwrap(), vec![file]);
    assert_eq!(session.current(), &Location::from_path(temp.path()));
}

#[test]
fn test_copy_path_uses_text_clipboard() {
    let temp = TempDir::new().unwrap();
    let clipboard = FakeTextClipboard::default();
    let (session, _log) = session();
    let mut session = session.with_text_clipboard(clipboard.clone());

    let location = Location::from_path(temp.path());
    let text = session.copy_path(&location).unwrap();

    assert_eq!(text, location.to_string());
    assert_eq!(clipboard.0.lock().unwrap().as_deref(), Some(text.as_str()));
    assert!(session.copy_path(&Location::CollectionRoot).is_err());
}

#[test]
fn test_create_in_current_folder() {
    let temp = TempDir::new().unwrap();
    let (mut session, _log) = session();

    assert!(matches!(session.create_file("a.txt"), Err(TransferError::InvalidTarget { .. })));

    session.navigate_to(Location::from_path(temp.path())).unwrap();
    assert_eq!(session.create_directory("New Folder").unwrap(), temp.path().join("New Folder"));
    assert_eq!(session.create_directory("New Folder").unwrap(), temp.path().join("New Folder_1"));
    assert_eq!(session.create_file("a.txt").unwrap(), temp.path().join("a.txt"));

    let names: Vec<String> = session.list().unwrap().into_iter().map(|i| i.name).collect();
    assert_eq!(names, ["New Folder", "New Folder_1", "a.txt"]);
}

#[test]
fn test_search_activation_records_history() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("logs")).unwrap();
    fs::write(temp.path().join("logs/app.log"), "").unwrap();
    let (mut session, _log) = session();
    session.navigate_to(Location::from_path(temp.path())).unwrap();

    let count = session.search("app").unwrap().len();
    assert_eq!(count, 1);
    let hit = session.activate_result(0).unwrap();

    assert_eq!(hit.path, temp.path().join("logs/app.log"));
    assert_eq!(session.current(), &Location::from_path(temp.path().join("logs")));
    assert_eq!(session.navigation().back_stack().last(), Some(&Location::from_path(temp.path())));
}

#[test]
fn test_properties_of_folder() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("one"), "1234").unwrap();
    let (session, _log) = session();

    let props = session.properties(&Location::from_path(temp.path())).unwrap();
    assert_eq!(props.kind, EntryKind::Directory);
    assert_eq!(props.size, 4);
    assert_eq!(props.files, 1);
}

#[test]
fn test_rename_updates_clipboard() {
    let temp = TempDir::new().unwrap();
    let old = temp.path().join("old.txt");
    fs::write(&old, "").unwrap();
    let (mut session, _log) = session();
    session.cut(&[old.clone()]).unwrap();

    let renamed = session.rename(&old, "new.txt").unwrap();

    assert_eq!(renamed, temp.path().join("new.txt"));
    assert!(!session.clipboard().contains(&old));
}
