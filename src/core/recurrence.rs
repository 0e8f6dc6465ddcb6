//! Materialises owed occurrences of recurring expense templates.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ledger::{Expense, Ledger, Notification, NotificationKind};

const PROCESSED_MESSAGE: &str = "Recurring transactions have been processed";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("expense {0} is not a recurring template")]
    NotRecurring(Uuid),
    #[error("recurring expense {0} has no frequency")]
    MissingFrequency(Uuid),
}

/// What one template owes up to a reference instant.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    /// New one-shot instances, oldest first.
    pub instances: Vec<Expense>,
    /// Cursor the template should carry afterwards; `None` when nothing was owed.
    pub cursor: Option<DateTime<Utc>>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Outcome of a scheduler pass over a whole ledger.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceReport {
    pub generated: Vec<Uuid>,
    pub templates_advanced: usize,
    pub skipped: Vec<Uuid>,
    pub notification: Option<Uuid>,
}

impl RecurrenceReport {
    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }
}

/// A template as shown in the recurring transactions view.
#[derive(Debug, Clone)]
pub struct RecurringTemplate<'a> {
    pub template: &'a Expense,
    pub next: Option<DateTime<Utc>>,
}

/// The next date the scheduler would emit for `template`.
pub fn next_occurrence(template: &Expense) -> Option<DateTime<Utc>> {
    if !template.recurring {
        return None;
    }
    template
        .frequency?
        .advance(template.baseline(), template.anchor_day())
}

/// Computes every occurrence owed by `template` at or before `now`.
///
/// The template itself is not modified; apply [`Projection::cursor`] to
/// commit the step.
pub fn project(template: &Expense, now: DateTime<Utc>) -> Result<Projection, RecurrenceError> {
    if !template.recurring {
        return Err(RecurrenceError::NotRecurring(template.id));
    }
    let frequency = template
        .frequency
        .ok_or(RecurrenceError::MissingFrequency(template.id))?;
    let anchor_day = template.anchor_day();

    let mut projection = Projection::default();
    let mut candidate = frequency.advance(template.baseline(), anchor_day);
    while let Some(date) = candidate {
        if date > now {
            break;
        }
        projection.instances.push(template.occurrence_at(date));
        projection.cursor = Some(date);
        candidate = frequency.advance(date, anchor_day);
    }
    Ok(projection)
}

/// Runs the scheduler over every template in the ledger.
///
/// All projections are computed before the ledger is touched, then applied
/// in one step. Templates with integrity faults are logged and skipped.
pub fn process_all(ledger: &mut Ledger, now: DateTime<Utc>) -> RecurrenceReport {
    let mut report = RecurrenceReport::default();
    let mut steps = Vec::new();

    for (index, template) in ledger.expenses.iter().enumerate() {
        if !template.is_template() {
            continue;
        }
        match project(template, now) {
            Ok(projection) if projection.is_empty() => {}
            Ok(projection) => steps.push((index, projection)),
            Err(err) => {
                warn!(template = %template.id, error = %err, "skipping recurring template");
                report.skipped.push(template.id);
            }
        }
    }

    if steps.is_empty() {
        debug!("no recurring occurrences owed");
        return report;
    }

    for (index, projection) in steps {
        ledger.expenses[index].last_processed = projection.cursor;
        report.templates_advanced += 1;
        for instance in projection.instances {
            report.generated.push(instance.id);
            ledger.expenses.push(instance);
        }
    }

    let message = format!("{PROCESSED_MESSAGE} ({} new)", report.generated.len());
    let notification = Notification::new(NotificationKind::Info, message, now);
    report.notification = Some(notification.id);
    ledger.push_notification(notification);
    info!(
        generated = report.generated.len(),
        templates = report.templates_advanced,
        "recurring occurrences generated"
    );
    report
}

/// Templates belonging to `account_id`, soonest next occurrence first.
pub fn recurring_templates(ledger: &Ledger, account_id: Uuid) -> Vec<RecurringTemplate<'_>> {
    let mut templates: Vec<RecurringTemplate<'_>> = ledger
        .expenses_for(account_id)
        .filter(|expense| expense.is_template())
        .map(|template| RecurringTemplate {
            template,
            next: next_occurrence(template),
        })
        .collect();
    templates.sort_by(|a, b| match (a.next, b.next) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.template.date.cmp(&b.template.date),
    });
    templates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Category, Frequency};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn template(date: DateTime<Utc>, frequency: Frequency) -> Expense {
        Expense::new(Uuid::new_v4(), 120.0, Category::Utilities, date, "Internet")
            .with_frequency(frequency)
    }

    #[test]
    fn daily_template_catches_up_to_now() {
        let source = template(at(2024, 1, 1), Frequency::Daily);
        let projection = project(&source, Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap())
            .expect("projection");
        let dates: Vec<_> = projection.instances.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![at(2024, 1, 2), at(2024, 1, 3), at(2024, 1, 4)]);
        assert_eq!(projection.cursor, Some(at(2024, 1, 4)));
        assert!(projection.instances.iter().all(|e| !e.recurring && e.frequency.is_none()));
    }

    #[test]
    fn second_run_at_same_instant_is_a_no_op() {
        let mut ledger = Ledger::new();
        let account = ledger.accounts[0].id;
        let mut source = template(at(2024, 1, 1), Frequency::Weekly);
        source.account_id = account;
        ledger.add_expense(source);
        let now = at(2024, 2, 10);

        let first = process_all(&mut ledger, now);
        assert_eq!(first.generated_count(), 5);
        assert_eq!(ledger.notifications.len(), 1);

        let second = process_all(&mut ledger, now);
        assert_eq!(second.generated_count(), 0);
        assert!(second.notification.is_none());
        assert_eq!(ledger.expenses.len(), 6);
        assert_eq!(ledger.notifications.len(), 1);
    }

    #[test]
    fn long_daily_backlog_is_caught_up_in_one_run() {
        let mut ledger = Ledger::new();
        let account = ledger.accounts[0].id;
        let mut source = template(at(1990, 1, 1), Frequency::Daily);
        source.account_id = account;
        let id = ledger.add_expense(source);
        let now = at(2024, 1, 1);

        let first = process_all(&mut ledger, now);
        assert_eq!(first.generated_count(), 12_418);
        assert_eq!(ledger.expense(id).unwrap().last_processed, Some(now));

        let second = process_all(&mut ledger, now);
        assert_eq!(second.generated_count(), 0);
        assert_eq!(ledger.expenses.len(), 12_419);
        assert_eq!(ledger.notifications.len(), 1);
    }

    #[test]
    fn occurrences_increase_strictly_and_never_pass_now() {
        let now = Utc.with_ymd_and_hms(2024, 12, 15, 9, 30, 0).unwrap();
        for frequency in Frequency::ALL {
            let source = template(Utc.with_ymd_and_hms(2023, 1, 31, 10, 0, 0).unwrap(), frequency);
            let projection = project(&source, now).expect("projection");
            let dates: Vec<_> = projection.instances.iter().map(|e| e.date).collect();
            assert!(dates.windows(2).all(|pair| pair[0] < pair[1]), "{frequency}");
            assert!(dates.iter().all(|date| *date <= now), "{frequency}");
            assert_eq!(projection.cursor, dates.last().copied());
        }
    }

    #[test]
    fn monthly_template_clamps_without_drifting() {
        let source = template(at(2024, 1, 31), Frequency::Monthly);
        let projection = project(&source, at(2024, 5, 1)).expect("projection");
        let dates: Vec<_> = projection.instances.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![at(2024, 2, 29), at(2024, 3, 31), at(2024, 4, 30)]);
    }

    #[test]
    fn cursor_resumes_from_last_processed() {
        let mut source = template(at(2024, 1, 31), Frequency::Monthly);
        source.last_processed = Some(at(2024, 2, 29));
        assert_eq!(next_occurrence(&source), Some(at(2024, 3, 31)));
    }

    #[test]
    fn templates_without_frequency_are_skipped_not_fatal() {
        let mut ledger = Ledger::new();
        let account = ledger.accounts[0].id;
        let mut broken = Expense::new(account, 10.0, Category::Other, at(2024, 1, 1), "Broken");
        broken.recurring = true;
        let broken_id = ledger.add_expense(broken);
        let mut healthy = template(at(2024, 1, 1), Frequency::Daily);
        healthy.account_id = account;
        ledger.add_expense(healthy);

        let report = process_all(&mut ledger, at(2024, 1, 3));
        assert_eq!(report.skipped, vec![broken_id]);
        assert_eq!(report.generated_count(), 2);
        assert_eq!(
            project(ledger.expense(broken_id).unwrap(), at(2024, 1, 3)).unwrap_err(),
            RecurrenceError::MissingFrequency(broken_id)
        );
    }

    #[test]
    fn one_shot_expenses_are_not_projected() {
        let one_shot = Expense::new(Uuid::new_v4(), 5.0, Category::Other, at(2024, 1, 1), "");
        assert_eq!(
            project(&one_shot, at(2024, 3, 1)).unwrap_err(),
            RecurrenceError::NotRecurring(one_shot.id)
        );
        assert!(next_occurrence(&one_shot).is_none());
    }

    #[test]
    fn recurring_view_orders_by_next_occurrence() {
        let mut ledger = Ledger::new();
        let account = ledger.accounts[0].id;
        let mut yearly = template(at(2024, 1, 10), Frequency::Yearly);
        yearly.account_id = account;
        let mut weekly = template(at(2024, 3, 1), Frequency::Weekly);
        weekly.account_id = account;
        let weekly_id = ledger.add_expense(weekly);
        let yearly_id = ledger.add_expense(yearly);

        let view = recurring_templates(&ledger, account);
        let ids: Vec<_> = view.iter().map(|entry| entry.template.id).collect();
        assert_eq!(ids, vec![weekly_id, yearly_id]);
        assert_eq!(view[0].next, Some(at(2024, 3, 8)));
    }
}
