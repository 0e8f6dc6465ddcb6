use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{category::Category, period::PeriodId};

/// A user-facing alert kept in the notification store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    /// Present on budget alerts; used to suppress duplicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_key: Option<AlertKey>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            created_at,
            read: false,
            alert_key: None,
        }
    }

    pub fn with_alert_key(mut self, key: AlertKey) -> Self {
        self.alert_key = Some(key);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::Info => "Info",
            NotificationKind::Warning => "Warning",
            NotificationKind::Success => "Success",
            NotificationKind::Error => "Alert",
        };
        f.write_str(label)
    }
}

/// Classification of a budget alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    Warning,
    Exceeded,
}

impl ThresholdKind {
    pub fn notification_kind(self) -> NotificationKind {
        match self {
            ThresholdKind::Warning => NotificationKind::Warning,
            ThresholdKind::Exceeded => NotificationKind::Error,
        }
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThresholdKind::Warning => "warning",
            ThresholdKind::Exceeded => "exceeded",
        };
        f.write_str(label)
    }
}

/// Identity of a budget alert: one per account, category, threshold and month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub account_id: Uuid,
    pub category: Category,
    pub threshold: ThresholdKind,
    pub period: PeriodId,
}
