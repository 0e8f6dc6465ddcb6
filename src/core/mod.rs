pub mod aggregation;
pub mod budget_monitor;
pub mod delivery;
pub mod ledger_manager;
pub mod recurrence;
pub mod services;
pub mod time;
pub mod utils;

pub use ledger_manager::{LedgerManager, RefreshReport};
pub use time::{Clock, FixedClock, SystemClock};
