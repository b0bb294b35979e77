//! Integration tests for the read-only filesystem view

use std::io::Read;
use std::sync::Arc;

use bundle_unpack::fs::storage::{MODE_EXECUTABLE, MODE_FILE};
use bundle_unpack::fs::{scope, Storage};
use bundle_unpack::{BundleFs, ErrorKind, FileKind, FilesystemView, Handle, MemoryTree, UnpackError};

fn sample_tree() -> MemoryTree {
    let mut tree = MemoryTree::new();
    tree.insert_file("Chart.yaml", "name: web\nversion: 1.0.0\n", MODE_FILE)
        .unwrap();
    tree.insert_file("templates/deployment.yaml", "kind: Deployment\n", MODE_FILE)
        .unwrap();
    tree.insert_file("templates/service.yaml", "kind: Service\n", MODE_FILE)
        .unwrap();
    tree.insert_file("hooks/pre.sh", "#!/bin/sh\n", MODE_EXECUTABLE)
        .unwrap();
    tree.insert_dir("crds").unwrap();
    tree
}

fn view() -> BundleFs {
    BundleFs::new(sample_tree())
}

#[test]
fn test_directory_handle_close_twice() {
    let mut handle = view().open("templates").unwrap();
    assert!(handle.is_dir());
    assert!(handle.close().is_ok());
    assert!(handle.close().is_ok());
    assert!(handle.is_closed());
}

#[test]
fn test_empty_directory_listing() {
    let fs = view();
    assert!(fs.read_dir("crds").unwrap().is_empty());

    let mut handle = fs.open("crds").unwrap();
    assert!(handle.read_dir(0).unwrap().is_empty());
    assert!(handle.read_dir(5).unwrap().is_empty());
}

#[test]
fn test_byte_read_on_directory_handle() {
    let mut handle = view().open("templates").unwrap();
    let mut buf = [0u8; 16];
    let err = handle.read(&mut buf).unwrap_err();
    assert!(matches!(err, UnpackError::IsADirectory { .. }));
    assert_eq!(err.kind(), ErrorKind::Filesystem);
}

#[test]
fn test_read_file_whole_and_streamed() {
    let fs = view();
    assert_eq!(fs.read_file("templates/service.yaml").unwrap(), b"kind: Service\n");

    let mut file = fs.open("Chart.yaml").unwrap().into_file().unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    assert_eq!(content, "name: web\nversion: 1.0.0\n");
    assert_eq!(file.stat().unwrap().size(), content.len() as u64);
}

#[test]
fn test_directory_entries_and_info() {
    let entries = view().read_dir(".").unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["Chart.yaml", "crds", "hooks", "templates"]);

    let templates = entries.iter().find(|e| e.name() == "templates").unwrap();
    assert!(templates.is_dir());
    assert_eq!(templates.info().unwrap().kind(), FileKind::Dir);

    let hook = view().stat("hooks/pre.sh").unwrap();
    assert!(hook.is_executable());
}

#[test]
fn test_bounded_listing_through_handle() {
    let fs = view();
    let Handle::Dir(dir) = fs.open(".").unwrap() else {
        panic!("root must open as a directory");
    };
    let first = dir.read_dir(2).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, dir.read_dir(2).unwrap());
    assert_eq!(dir.read_dir(-1).unwrap().len(), 4);
}

#[test]
fn test_closed_file_handle() {
    let mut handle = view().open("Chart.yaml").unwrap();
    handle.close().unwrap();
    let mut buf = [0u8; 4];
    assert!(matches!(
        handle.read(&mut buf),
        Err(UnpackError::HandleClosed { .. })
    ));
    assert!(matches!(handle.stat(), Err(UnpackError::HandleClosed { .. })));
}

#[test]
fn test_path_rules() {
    let fs = view();
    for path in ["..", "../Chart.yaml", "/Chart.yaml", "templates//service.yaml", "templates/./service.yaml"] {
        let err = fs.read_file(path).unwrap_err();
        assert!(matches!(err, UnpackError::InvalidPath { .. }), "{path}");
    }
    assert!(matches!(
        fs.read_file("templates/missing.yaml"),
        Err(UnpackError::NotFound { .. })
    ));
    assert!(matches!(
        fs.read_dir("Chart.yaml"),
        Err(UnpackError::NotADirectory { .. })
    ));
}

#[test]
fn test_scoped_view() {
    let root: Arc<dyn Storage> = Arc::new(sample_tree());
    let scoped = scope(root, Some("templates"), "file:///repo").unwrap();
    let fs = BundleFs::from_shared(scoped);

    let names: Vec<String> = fs
        .read_dir(".")
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["deployment.yaml", "service.yaml"]);
    assert!(fs.read_file("Chart.yaml").is_err());
    // No path can climb out of the scope
    assert!(matches!(
        fs.read_file("../Chart.yaml"),
        Err(UnpackError::InvalidPath { .. })
    ));
}

#[test]
fn test_scope_rejects_escape() {
    let root: Arc<dyn Storage> = Arc::new(sample_tree());
    let err = scope(root, Some("../outside"), "file:///repo").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Containment);
    assert_eq!(
        err.to_string(),
        "get subdirectory \"../outside\" for repository \"file:///repo\": directory can not start with '../' or '/'"
    );
}

#[test]
fn test_walk_lists_everything() {
    let paths: Vec<String> = view()
        .walk(".")
        .unwrap()
        .into_iter()
        .map(|(path, _)| path)
        .collect();
    assert_eq!(
        paths,
        vec![
            "Chart.yaml",
            "crds",
            "hooks",
            "hooks/pre.sh",
            "templates",
            "templates/deployment.yaml",
            "templates/service.yaml",
        ]
    );
}

#[test]
fn test_view_shared_across_threads() {
    let fs = view();
    std::thread::scope(|s| {
        for _ in 0..4 {
            let fs = fs.clone();
            s.spawn(move || {
                assert_eq!(fs.read_file("templates/deployment.yaml").unwrap(), b"kind: Deployment\n");
            });
        }
    });
}
