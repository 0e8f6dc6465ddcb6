//! Notification store operations.
//!
//! Budget alerts are suppressed by the keys of notifications still present in
//! the store, so marking an alert read keeps it suppressed while clearing the
//! store lets a still-crossed threshold be raised again.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{Ledger, Notification};

pub struct NotificationService;

impl NotificationService {
    pub fn push(ledger: &mut Ledger, notification: Notification) -> Uuid {
        let id = notification.id;
        ledger.push_notification(notification);
        id
    }

    pub fn mark_read(ledger: &mut Ledger, id: Uuid) -> ServiceResult<()> {
        let notification = ledger
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
            .ok_or_else(|| ServiceError::Invalid("Notification not found".into()))?;
        notification.read = true;
        ledger.touch();
        Ok(())
    }

    /// Marks every notification read and returns how many changed.
    pub fn mark_all_read(ledger: &mut Ledger) -> usize {
        let mut changed = 0;
        for notification in ledger.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        if changed > 0 {
            ledger.touch();
        }
        changed
    }

    /// Empties the store and returns how many notifications were removed.
    pub fn clear_all(ledger: &mut Ledger) -> usize {
        let removed = ledger.notifications.len();
        ledger.notifications.clear();
        if removed > 0 {
            ledger.touch();
        }
        removed
    }

    pub fn unread_count(ledger: &Ledger) -> usize {
        ledger.notifications.iter().filter(|n| !n.read).count()
    }

    /// Later insertions win ties on `created_at`.
    pub fn newest_first(ledger: &Ledger) -> Vec<&Notification> {
        let mut notifications: Vec<&Notification> = ledger.notifications.iter().rev().collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NotificationKind;
    use chrono::{Duration, Utc};

    fn seeded() -> (Ledger, Uuid, Uuid) {
        let mut ledger = Ledger::new();
        let now = Utc::now();
        let older = NotificationService::push(
            &mut ledger,
            Notification::new(NotificationKind::Info, "older", now - Duration::hours(1)),
        );
        let newer = NotificationService::push(
            &mut ledger,
            Notification::new(NotificationKind::Warning, "newer", now),
        );
        (ledger, older, newer)
    }

    #[test]
    fn read_state_and_counts() {
        let (mut ledger, older, _) = seeded();
        assert_eq!(NotificationService::unread_count(&ledger), 2);
        NotificationService::mark_read(&mut ledger, older).unwrap();
        assert_eq!(NotificationService::unread_count(&ledger), 1);
        assert_eq!(NotificationService::mark_all_read(&mut ledger), 1);
        assert_eq!(NotificationService::unread_count(&ledger), 0);
        assert!(NotificationService::mark_read(&mut ledger, Uuid::new_v4()).is_err());
    }

    #[test]
    fn listing_and_clearing() {
        let (mut ledger, older, newer) = seeded();
        let ids: Vec<_> = NotificationService::newest_first(&ledger)
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![newer, older]);
        assert_eq!(NotificationService::clear_all(&mut ledger), 2);
        assert!(ledger.notifications.is_empty());
    }
}
