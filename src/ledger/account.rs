use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named bucket that partitions expenses and budgets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: AccountKind,
    #[serde(default = "Account::default_color")]
    pub color: String,
}

impl Account {
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            color: kind.default_color().to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn default_color() -> String {
        AccountKind::Other.default_color().to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[default]
    Personal,
    Business,
    Savings,
    Other,
}

impl AccountKind {
    pub fn default_color(self) -> &'static str {
        match self {
            AccountKind::Personal => "#0088FE",
            AccountKind::Business => "#00C49F",
            AccountKind::Savings => "#FFBB28",
            AccountKind::Other => "#FF8042",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Personal => "Personal",
            AccountKind::Business => "Business",
            AccountKind::Savings => "Savings",
            AccountKind::Other => "Other",
        };
        f.write_str(label)
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(AccountKind::Personal),
            "business" => Ok(AccountKind::Business),
            "savings" => Ok(AccountKind::Savings),
            "other" => Ok(AccountKind::Other),
            other => Err(format!("unknown account type `{other}`")),
        }
    }
}
