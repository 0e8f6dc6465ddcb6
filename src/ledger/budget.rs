use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;

/// A spending guardrail for one category of one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub category: Category,
    pub limit: f64,
    #[serde(default)]
    pub period: BudgetPeriod,
    pub account_id: Uuid,
    /// Percentage at which a warning is raised; falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<f64>,
}

impl Budget {
    pub fn new(account_id: Uuid, category: Category, limit: f64, period: BudgetPeriod) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            limit,
            period,
            account_id,
            alert_threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.alert_threshold = Some(threshold);
        self
    }

    pub fn threshold_or(&self, default: f64) -> f64 {
        self.alert_threshold.unwrap_or(default)
    }

    /// Percentage of the limit consumed; `None` when the limit cannot be divided by.
    pub fn percent_used(&self, spent: f64) -> Option<f64> {
        if self.limit.is_finite() && self.limit > 0.0 {
            Some(spent / self.limit * 100.0)
        } else {
            None
        }
    }
}

/// Enumeration of budgeting periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(format!("unknown budget period `{other}`")),
        }
    }
}
