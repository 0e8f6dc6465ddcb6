use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{category::Category, expense::Expense};
use crate::errors::LedgerError;

/// Pre-filled expense proposed by receipt extraction. Every field is optional
/// and untrusted until [`ExpenseDraft::into_expense`] accepts it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseDraft {
    #[serde(default)]
    pub amount: Option<DraftAmount>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receipt_text: Option<String>,
}

/// Extractors report totals either as numbers or as raw text such as `"₹1,250.00"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DraftAmount {
    Number(f64),
    Text(String),
}

const CURRENCY_PREFIXES: &[&str] = &["rs.", "rs", "inr"];
const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£', '¥'];

impl DraftAmount {
    fn parse(&self) -> Result<f64, LedgerError> {
        match self {
            DraftAmount::Number(value) => Ok(*value),
            DraftAmount::Text(raw) => parse_amount_text(raw).ok_or_else(|| {
                LedgerError::Validation(format!("`{}` is not a valid amount", raw.trim()))
            }),
        }
    }
}

/// Accepts a plain decimal once currency markers, whitespace and thousands
/// separators are removed. Anything else left over rejects the amount.
fn parse_amount_text(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    let lowered = text.to_ascii_lowercase();
    if let Some(prefix) = CURRENCY_PREFIXES
        .iter()
        .find(|prefix| lowered.starts_with(*prefix))
    {
        text = &text[prefix.len()..];
    }
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    let digits = cleaned.strip_prefix('-').unwrap_or(&cleaned);
    let well_formed = !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !well_formed {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

impl ExpenseDraft {
    /// Normalises the draft into an expense for `account_id`, applying the same
    /// validation as manual entry. A missing date defaults to `now`.
    pub fn into_expense(self, account_id: Uuid, now: DateTime<Utc>) -> Result<Expense, LedgerError> {
        let amount = self
            .amount
            .as_ref()
            .ok_or_else(|| LedgerError::Validation("amount is required".into()))?
            .parse()?;
        let category = self
            .category
            .as_deref()
            .map(Category::from_label_or_other)
            .unwrap_or(Category::Other);
        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_draft_date(raw)?,
            _ => now,
        };

        let mut expense = Expense::new(
            account_id,
            amount,
            category,
            date,
            self.description.unwrap_or_default(),
        );
        expense.receipt_text = self.receipt_text.filter(|text| !text.trim().is_empty());
        expense.normalize();
        expense.validate()?;
        Ok(expense)
    }
}

fn parse_draft_date(raw: &str) -> Result<DateTime<Utc>, LedgerError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| LedgerError::Validation(format!("`{raw}` is not a valid date")))
}
