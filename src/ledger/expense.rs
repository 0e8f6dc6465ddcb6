use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{category::Category, frequency::Frequency};
use crate::errors::LedgerError;

/// A single spending record, or a recurring template that generates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub category: Category,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub account_id: Uuid,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    /// Latest occurrence generated from this template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_text: Option<String>,
}

impl Expense {
    pub fn new(
        account_id: Uuid,
        amount: f64,
        category: Category,
        date: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            category,
            date,
            description: description.into(),
            account_id,
            recurring: false,
            frequency: None,
            last_processed: None,
            receipt_text: None,
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.recurring = true;
        self.frequency = Some(frequency);
        self
    }

    pub fn is_template(&self) -> bool {
        self.recurring
    }

    /// Instant the next occurrence is computed from.
    pub fn baseline(&self) -> DateTime<Utc> {
        self.last_processed.unwrap_or(self.date)
    }

    /// Day of month every monthly/yearly occurrence aims for.
    pub fn anchor_day(&self) -> u32 {
        self.date.day()
    }

    /// Builds a one-shot occurrence of this template dated `date`.
    pub fn occurrence_at(&self, date: DateTime<Utc>) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            date,
            recurring: false,
            frequency: None,
            last_processed: None,
            ..self.clone()
        }
    }

    /// Drops recurrence-only fields from one-shot records.
    pub fn normalize(&mut self) {
        if !self.recurring {
            self.frequency = None;
            self.last_processed = None;
        }
        self.description = self.description.trim().to_string();
    }

    /// Entry validation shared by manual input and receipt drafts.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(LedgerError::Validation(
                "amount must be a positive number".into(),
            ));
        }
        if self.recurring && self.frequency.is_none() {
            return Err(LedgerError::Validation(
                "recurring expenses need a frequency".into(),
            ));
        }
        Ok(())
    }

    pub fn display_label(&self) -> String {
        if self.description.is_empty() {
            self.category.label().to_string()
        } else {
            self.description.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template() -> Expense {
        let date = Utc.with_ymd_and_hms(2024, 3, 31, 8, 0, 0).unwrap();
        Expense::new(Uuid::new_v4(), 499.0, Category::Subscriptions, date, "Streaming")
            .with_frequency(Frequency::Monthly)
    }

    #[test]
    fn occurrences_are_one_shot_copies() {
        let mut source = template();
        source.last_processed = Some(source.date);
        let next = Utc.with_ymd_and_hms(2024, 4, 30, 8, 0, 0).unwrap();
        let instance = source.occurrence_at(next);
        assert_ne!(instance.id, source.id);
        assert!(!instance.recurring);
        assert!(instance.frequency.is_none());
        assert!(instance.last_processed.is_none());
        assert_eq!(instance.date, next);
        assert_eq!(instance.amount, source.amount);
        assert_eq!(instance.account_id, source.account_id);
    }

    #[test]
    fn normalize_strips_recurrence_from_one_shot_records() {
        let mut expense = template();
        expense.recurring = false;
        expense.last_processed = Some(expense.date);
        expense.description = "  Streaming  ".into();
        expense.normalize();
        assert!(expense.frequency.is_none());
        assert!(expense.last_processed.is_none());
        assert_eq!(expense.description, "Streaming");
    }

    #[test]
    fn validate_rejects_bad_amounts_and_missing_frequency() {
        let mut expense = template();
        assert!(expense.validate().is_ok());
        expense.frequency = None;
        assert!(expense.validate().is_err());
        let mut one_shot = template();
        one_shot.recurring = false;
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            one_shot.amount = amount;
            assert!(one_shot.validate().is_err(), "accepted {amount}");
        }
    }

    #[test]
    fn baseline_prefers_cursor() {
        let mut expense = template();
        assert_eq!(expense.baseline(), expense.date);
        let cursor = Utc.with_ymd_and_hms(2024, 5, 31, 8, 0, 0).unwrap();
        expense.last_processed = Some(cursor);
        assert_eq!(expense.baseline(), cursor);
        assert_eq!(expense.anchor_day(), 31);
    }
}
