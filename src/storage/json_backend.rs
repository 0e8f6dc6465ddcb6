use std::{
    collections::HashSet,
    fs,
    path::{Component, Path, PathBuf},
};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::LedgerError,
    ledger::Ledger,
};

use super::{LoadReport, Result, StorageBackend};

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
pub const DEFAULT_RETENTION: usize = 5;

/// Stores each ledger as one pretty-printed JSON document under
/// `<base>/ledgers/`, keeping rolling copies of replaced files under
/// `<base>/backups/<name>/`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let ledgers_dir = PathResolver::ledger_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&ledgers_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            ledgers_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_name = format!(
            "{}_{}.{}",
            canonical_name(name),
            timestamp,
            LEDGER_EXTENSION
        );
        fs::copy(path, dir.join(&backup_name))?;
        debug!(backup = %backup_name, "ledger backup written");
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, entry);
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self, name: &str) -> Result<Option<LoadReport>> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Ok(None);
        }
        load_ledger_from_path(&path).map(Some)
    }

    fn save(&self, name: &str, ledger: &Ledger) -> Result<()> {
        let path = self.ledger_path(name);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        self.backup_existing_file(name, &path)?;
        save_ledger_to_path(ledger, &path)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(file_name.to_string());
            }
        }
        entries.sort_by(|a, b| backup_timestamp(b).cmp(backup_timestamp(a)).then(b.cmp(a)));
        Ok(entries)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<LoadReport> {
        if !is_plain_file_name(backup_name) {
            return Err(LedgerError::Validation(format!(
                "backup name `{}` must be a file name",
                backup_name
            )));
        }
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::NotFound(format!("backup `{}`", backup_name)));
        }
        let data = fs::read_to_string(&backup_path)?;
        let report = decode_ledger(&data);
        let target = self.ledger_path(name);
        self.backup_existing_file(name, &target)?;
        write_atomic(&target, &data)?;
        Ok(report)
    }
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    write_atomic(path, &json)?;
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<LoadReport> {
    let data = fs::read_to_string(path)?;
    Ok(decode_ledger(&data))
}

/// Decodes a stored document, skipping what cannot be read instead of failing.
pub fn decode_ledger(data: &str) -> LoadReport {
    let mut warnings = Vec::new();
    let document = match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warnings.push("stored ledger is not a JSON object; starting fresh".to_string());
            None
        }
        Err(err) => {
            warnings.push(format!("stored ledger could not be parsed ({err}); starting fresh"));
            None
        }
    };

    let mut ledger = Ledger::empty();
    if let Some(mut document) = document {
        ledger.accounts = decode_collection(&mut document, "accounts", &mut warnings);
        ledger.expenses = decode_collection(&mut document, "expenses", &mut warnings);
        ledger.budgets = decode_collection(&mut document, "budgets", &mut warnings);
        ledger.notifications = decode_collection(&mut document, "notifications", &mut warnings);
        ledger.active_account = decode_field(&mut document, "active_account");
        if let Some(created_at) = decode_field(&mut document, "created_at") {
            ledger.created_at = created_at;
        }
        if let Some(updated_at) = decode_field(&mut document, "updated_at") {
            ledger.updated_at = updated_at;
        }
        if let Some(version) = decode_field(&mut document, "schema_version") {
            ledger.schema_version = version;
        }
        if ledger.accounts.is_empty() {
            warnings.push("no accounts found; default accounts created".to_string());
        }
    }
    ledger.seed_default_accounts();
    warnings.extend(integrity_warnings(&ledger));

    for warning in &warnings {
        warn!("{warning}");
    }
    LoadReport { ledger, warnings }
}

fn decode_collection<T: DeserializeOwned>(
    document: &mut Map<String, Value>,
    key: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    match document.remove(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(value) => Some(value),
                Err(err) => {
                    warnings.push(format!("skipped {key}[{index}]: {err}"));
                    None
                }
            })
            .collect(),
        Some(_) => {
            warnings.push(format!("`{key}` is not a list; treated as empty"));
            Vec::new()
        }
    }
}

fn decode_field<T: DeserializeOwned>(document: &mut Map<String, Value>, key: &str) -> Option<T> {
    document
        .remove(key)
        .and_then(|value| serde_json::from_value(value).ok())
}

/// Reports records that decoded fine but break ledger invariants.
pub fn integrity_warnings(ledger: &Ledger) -> Vec<String> {
    let account_ids: HashSet<_> = ledger.accounts.iter().map(|a| a.id).collect();
    let mut warnings = Vec::new();

    for expense in &ledger.expenses {
        if !account_ids.contains(&expense.account_id) {
            warnings.push(format!(
                "expense {} references unknown account {}",
                expense.id, expense.account_id
            ));
        }
        if expense.recurring && expense.frequency.is_none() {
            warnings.push(format!(
                "recurring expense {} has no frequency",
                expense.id
            ));
        }
    }
    for budget in &ledger.budgets {
        if !account_ids.contains(&budget.account_id) {
            warnings.push(format!(
                "budget {} references unknown account {}",
                budget.id, budget.account_id
            ));
        }
        if !(budget.limit.is_finite() && budget.limit > 0.0) {
            warnings.push(format!("budget {} has a non-positive limit", budget.id));
        }
    }
    warnings
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

/// Single normal path component, no separators of either platform.
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Fixed-width digit suffix of a backup name, so string order is time order.
fn backup_timestamp(name: &str) -> &str {
    name.strip_suffix(".json")
        .and_then(|stem| stem.rsplit('_').next())
        .filter(|digits| digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or("")
}
