#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Instant;
use ticket_desk::storage::SqliteStorage;
use tracing::info;

pub mod cli;
pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        ticket_desk::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl TestLogGuard {
    fn new(name: &str) -> Self {
        init_test_logging();
        info!("{name}: starting");
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    TestLogGuard::new(name)
}

/// Fresh in-memory database.
pub fn test_db() -> SqliteStorage {
    init_test_logging();
    SqliteStorage::open_memory().expect("open in-memory db")
}

/// File-backed database under `dir` that never waits on a lock, so a second
/// connection can make it fail on demand.
pub fn file_db(dir: &Path) -> (SqliteStorage, PathBuf) {
    init_test_logging();
    let path = dir.join("tickets.db");
    let storage = SqliteStorage::open_with_timeout(&path, Some(0)).expect("open file db");
    (storage, path)
}
