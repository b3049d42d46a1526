use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

// A single test: the global subscriber can only be installed once per binary.
#[test]
#[serial]
fn writes_log_file_and_ignores_second_init() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dock.log");

    tile_dock::logging::init(true, Some(path.clone()));
    tracing::info!("first message");

    tile_dock::logging::init(false, None);
    tracing::info!("second message");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("first message"));
    assert!(contents.contains("second message"));
}
