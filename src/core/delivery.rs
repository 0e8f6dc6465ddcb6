//! Outbound delivery of budget alerts (email or equivalent).
//!
//! Delivery is best-effort: the outcome is reported to the caller and never
//! feeds back into which alerts were raised.

use thiserror::Error;
use tracing::info;

use super::budget_monitor::BudgetAlert;
use crate::ledger::Category;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("no delivery destination configured")]
    MissingDestination,
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Payload handed to a delivery adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryMessage {
    pub destination: String,
    pub subject: String,
    pub body: String,
    pub current_spent: f64,
    pub budget_limit: f64,
    pub remaining: f64,
    pub over_budget: bool,
}

impl DeliveryMessage {
    pub fn for_alert(destination: impl Into<String>, alert: &BudgetAlert) -> Self {
        Self {
            destination: destination.into(),
            subject: subject_for(alert.key.category, alert.over_budget()),
            body: alert.message.clone(),
            current_spent: alert.spent,
            budget_limit: alert.limit,
            remaining: alert.remaining(),
            over_budget: alert.over_budget(),
        }
    }
}

fn subject_for(category: Category, over_budget: bool) -> String {
    if over_budget {
        format!("Budget exceeded: {category}")
    } else {
        format!("Budget warning: {category}")
    }
}

/// Adapter boundary for notification delivery services.
pub trait NotificationDelivery: Send + Sync {
    fn deliver(&self, message: &DeliveryMessage) -> Result<(), DeliveryError>;
}

/// Delivery adapter that records messages in the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

impl NotificationDelivery for LogDelivery {
    fn deliver(&self, message: &DeliveryMessage) -> Result<(), DeliveryError> {
        if message.destination.trim().is_empty() {
            return Err(DeliveryError::MissingDestination);
        }
        info!(
            destination = %message.destination,
            subject = %message.subject,
            spent = message.current_spent,
            limit = message.budget_limit,
            "budget alert delivered"
        );
        Ok(())
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOutcome {
    pub message: DeliveryMessage,
    pub result: Result<(), DeliveryError>,
}

impl DeliveryOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}
