use std::{env, io};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::{
        delivery::{LogDelivery, NotificationDelivery},
        services::ServiceError,
        time::{Clock, FixedClock, SystemClock},
        utils::PathResolver,
        LedgerManager, RefreshReport,
    },
    errors::LedgerError,
    storage::JsonStorage,
};

use super::output;

pub const LEDGER_NAME: &str = "main";
const NOW_ENV: &str = "KHARCHA_NOW";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("invalid KHARCHA_NOW value `{0}` (expected RFC 3339)")]
    InvalidClock(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Ledger(err) => CommandError::Ledger(err),
            ServiceError::Invalid(message) => CommandError::Message(message),
        }
    }
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// State shared by every command of one shell session.
pub struct ShellContext {
    pub(crate) manager: LedgerManager,
    pub(crate) running: bool,
}

impl ShellContext {
    /// Opens the ledger under `KHARCHA_HOME` (or `~/.kharcha`).
    pub fn new() -> Result<Self, CliError> {
        let base = PathResolver::base_dir();
        let config = ConfigManager::with_base_dir(base.clone())?.load()?;
        let data_dir = config.data_dir.clone().unwrap_or(base);
        let storage = JsonStorage::new(Some(data_dir), None)?;
        let delivery: Option<Box<dyn NotificationDelivery>> = match config.alert_email {
            Some(_) => Some(Box::new(LogDelivery)),
            None => None,
        };
        let manager = LedgerManager::open_with_delivery(
            Box::new(storage),
            LEDGER_NAME,
            clock_from_env()?,
            config,
            delivery,
        )?;
        let context = Self {
            manager,
            running: true,
        };
        for warning in context.manager.load_warnings() {
            output::warning(warning);
        }
        context.report_refresh(context.manager.last_refresh());
        Ok(context)
    }

    pub(crate) fn config(&self) -> &Config {
        self.manager.config()
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        self.config().format_amount(amount)
    }

    /// Prints what a refresh generated or raised.
    pub(crate) fn report_refresh(&self, report: &RefreshReport) {
        let generated = report.recurrence.generated_count();
        if generated > 0 {
            output::info(format!("Generated {} recurring expense(s)", generated));
        }
        for alert in &report.alerts {
            if alert.over_budget() {
                output::error(&alert.message);
            } else {
                output::warning(&alert.message);
            }
        }
        for outcome in &report.deliveries {
            if let Err(err) = &outcome.result {
                output::warning(format!("Alert email not sent: {}", err));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help` for usage details.");
            }
            other => output::error(other),
        }
    }
}

fn clock_from_env() -> Result<Box<dyn Clock>, CliError> {
    match env::var(NOW_ENV) {
        Ok(raw) if !raw.trim().is_empty() => {
            let instant = DateTime::parse_from_rfc3339(raw.trim())
                .map_err(|_| CliError::InvalidClock(raw.clone()))?;
            Ok(Box::new(FixedClock::at(instant.with_timezone(&Utc))))
        }
        _ => Ok(Box::new(SystemClock)),
    }
}

/// First eight hex digits of an identifier, as shown in listings.
pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

/// Resolves a listing prefix to exactly one identifier.
pub(crate) fn resolve_prefix<I>(prefix: &str, ids: I, noun: &str) -> Result<Uuid, CommandError>
where
    I: IntoIterator<Item = Uuid>,
{
    let needle = prefix.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(CommandError::InvalidArguments(format!("missing {noun} id")));
    }
    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::Message(format!("no {noun} matches `{prefix}`"))),
        _ => Err(CommandError::Message(format!(
            "`{prefix}` matches more than one {noun}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_resolve_uniquely() {
        let a = Uuid::parse_str("aaaa1111-0000-4000-8000-000000000000").unwrap();
        let b = Uuid::parse_str("aaaa2222-0000-4000-8000-000000000000").unwrap();
        assert_eq!(resolve_prefix("aaaa1", [a, b], "expense").unwrap(), a);
        assert!(resolve_prefix("aaaa", [a, b], "expense").is_err());
        assert!(resolve_prefix("ffff", [a, b], "expense").is_err());
        assert_eq!(short_id(a), "aaaa1111");
    }
}
