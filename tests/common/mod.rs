#![allow(dead_code)]

use std::{path::Path, sync::Mutex};

use chrono::{DateTime, TimeZone, Utc};
use kharcha_core::{
    config::Config,
    core::{FixedClock, LedgerManager},
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const LEDGER: &str = "main";

/// Noon UTC on the given day.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Creates an isolated data directory that lives until the test binary exits.
pub fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn storage(base: &Path) -> JsonStorage {
    JsonStorage::new(Some(base.to_path_buf()), Some(3)).expect("create json storage backend")
}

/// Opens the test ledger under `base` with the clock pinned to `now`.
pub fn open_at(base: &Path, now: DateTime<Utc>) -> LedgerManager {
    LedgerManager::open(
        Box::new(storage(base)),
        LEDGER,
        Box::new(FixedClock::at(now)),
        Config::default(),
    )
    .expect("open ledger")
}

/// Fresh manager in its own directory.
pub fn setup_manager(now: DateTime<Utc>) -> (LedgerManager, std::path::PathBuf) {
    let base = temp_base();
    (open_at(&base, now), base)
}
