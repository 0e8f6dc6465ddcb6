//! Ledger domain models, persistence-friendly types, and helpers.

pub mod account;
pub mod budget;
pub mod category;
pub mod draft;
pub mod expense;
pub mod frequency;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod notification;
pub mod period;

pub use account::{Account, AccountKind};
pub use budget::{Budget, BudgetPeriod};
pub use category::Category;
pub use draft::{DraftAmount, ExpenseDraft};
pub use expense::Expense;
pub use frequency::Frequency;
pub use ledger::Ledger;
pub use notification::{AlertKey, Notification, NotificationKind, ThresholdKind};
pub use period::PeriodId;
