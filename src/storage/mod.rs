pub mod json_backend;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A ledger decoded from storage together with anything that had to be
/// repaired or skipped on the way in.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub ledger: Ledger,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn clean(ledger: Ledger) -> Self {
        Self {
            ledger,
            warnings: Vec::new(),
        }
    }
}

/// Abstraction over persistence backends capable of storing ledgers and snapshots.
pub trait StorageBackend: Send + Sync {
    /// Loads the ledger stored under `name`; `Ok(None)` on first run.
    fn load(&self, name: &str) -> Result<Option<LoadReport>>;
    fn save(&self, name: &str, ledger: &Ledger) -> Result<()>;
    /// Backup file names, newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    /// Replaces the stored ledger with a backup and returns it.
    fn restore(&self, name: &str, backup_name: &str) -> Result<LoadReport>;
}

pub use json_backend::{integrity_warnings, JsonStorage, DEFAULT_RETENTION};
