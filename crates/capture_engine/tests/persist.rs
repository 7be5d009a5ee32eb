use std::fs;

use capture_engine::{create_capture_dir, CaptureWriter, PersistError};
use tempfile::TempDir;

#[tokio::test]
async fn creates_missing_root_and_capture_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("page-capture").join("capture-1");
    create_capture_dir(&dir).await.unwrap();
    assert!(dir.is_dir());
}

#[tokio::test]
async fn existing_capture_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("capture-1");
    create_capture_dir(&dir).await.unwrap();

    let err = create_capture_dir(&dir).await.unwrap_err();
    assert!(matches!(err, PersistError::CaptureDir { .. }));
}

#[test]
fn writer_creates_nested_folders_and_replaces_files() {
    let temp = TempDir::new().unwrap();
    let writer = CaptureWriter::new(temp.path().join("home"));

    let first = writer.write("css/site.css", b"body{}").unwrap();
    assert_eq!(first, temp.path().join("home/css/site.css"));
    assert_eq!(fs::read(&first).unwrap(), b"body{}");

    let second = writer.write("css/site.css", b"p{}").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "p{}");
}

#[tokio::test]
async fn save_writes_from_async_context() {
    let temp = TempDir::new().unwrap();
    let writer = CaptureWriter::new(temp.path().join("home"));

    let path = writer
        .save("images/logo.png".to_string(), b"PNG".to_vec())
        .await
        .unwrap();
    assert_eq!(path, temp.path().join("home/images/logo.png"));
    assert_eq!(fs::read(&path).unwrap(), b"PNG");

    assert!(matches!(
        writer.save("../escape.html".to_string(), b"x".to_vec()).await,
        Err(PersistError::Escapes(_))
    ));
}

#[test]
fn writer_refuses_paths_outside_base() {
    let temp = TempDir::new().unwrap();
    let writer = CaptureWriter::new(temp.path().join("home"));

    assert!(matches!(
        writer.write("../escape.html", b"x"),
        Err(PersistError::Escapes(_))
    ));
    assert!(matches!(
        writer.write("/etc/passwd", b"x"),
        Err(PersistError::Escapes(_))
    ));
    assert!(!temp.path().join("escape.html").exists());
}

#[test]
fn no_partial_file_when_base_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = CaptureWriter::new(file_path.clone());
    assert!(writer.write("index.html", b"data").is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
