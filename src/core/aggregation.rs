//! Pure grouping and summing over expense collections.
//!
//! Totals are accumulated in ascending amount order so the result does not
//! depend on the order records were supplied in, down to the last bit.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Utc};

use crate::ledger::{Category, Expense, PeriodId};

/// One category's slice of a month's spending.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: f64,
    /// Percentage of the month's total.
    pub share: f64,
}

/// Headline figures for an account's expenses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendingSummary {
    pub total: f64,
    pub average: f64,
    pub recent_total: f64,
    pub recent_days: i64,
    pub count: usize,
}

impl SpendingSummary {
    pub fn compute<'a, I>(expenses: I, now: DateTime<Utc>, recent_days: i64) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let all: Vec<&Expense> = expenses.into_iter().collect();
        let total = stable_sum(all.iter().map(|expense| expense.amount));
        let count = all.len();
        let average = if count > 0 { total / count as f64 } else { 0.0 };
        let recent = recent_window_filter(all.iter().copied(), now, recent_days);
        Self {
            total,
            average,
            recent_total: stable_sum(recent.iter().map(|expense| expense.amount)),
            recent_days,
            count,
        }
    }
}

/// Sums amounts per category.
pub fn sum_by_category<'a, I>(expenses: I) -> BTreeMap<Category, f64>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut grouped: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for expense in expenses {
        grouped.entry(expense.category).or_default().push(expense.amount);
    }
    grouped
        .into_iter()
        .map(|(category, amounts)| (category, stable_sum(amounts)))
        .collect()
}

/// Sums amounts per calendar month, oldest month first.
pub fn sum_by_month<'a, I>(expenses: I) -> BTreeMap<PeriodId, f64>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut grouped: BTreeMap<PeriodId, Vec<f64>> = BTreeMap::new();
    for expense in expenses {
        grouped
            .entry(PeriodId::containing(expense.date))
            .or_default()
            .push(expense.amount);
    }
    grouped
        .into_iter()
        .map(|(period, amounts)| (period, stable_sum(amounts)))
        .collect()
}

/// Expenses dated in the same calendar month and year as `now`.
pub fn current_period_filter<'a, I>(expenses: I, now: DateTime<Utc>) -> Vec<&'a Expense>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let period = PeriodId::containing(now);
    expenses
        .into_iter()
        .filter(|expense| period.contains(expense.date))
        .collect()
}

/// Expenses dated in the same calendar year as `now`.
pub fn current_year_filter<'a, I>(expenses: I, now: DateTime<Utc>) -> Vec<&'a Expense>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let period = PeriodId::containing(now);
    expenses
        .into_iter()
        .filter(|expense| period.year_contains(expense.date))
        .collect()
}

/// Expenses dated within the `days` days up to and including `now`.
/// A window reaching past the earliest representable date has no lower bound.
pub fn recent_window_filter<'a, I>(expenses: I, now: DateTime<Utc>, days: i64) -> Vec<&'a Expense>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let start = now.checked_sub_days(Days::new(days.max(0).unsigned_abs()));
    expenses
        .into_iter()
        .filter(|expense| start.map_or(true, |start| expense.date >= start) && expense.date <= now)
        .collect()
}

/// Percent change of this month's spending over last month's.
pub fn month_over_month_change<'a, I>(expenses: I, now: DateTime<Utc>) -> Option<f64>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let monthly = sum_by_month(expenses);
    let current_period = PeriodId::containing(now);
    let current = monthly.get(&current_period)?;
    let previous = monthly.get(&current_period.previous())?;
    if *previous <= 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// The `limit` largest categories of the current month.
pub fn top_categories<'a, I>(expenses: I, now: DateTime<Utc>, limit: usize) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let month = current_period_filter(expenses, now);
    let totals = sum_by_category(month);
    let month_total = stable_sum(totals.values().copied());
    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            share: if month_total > 0.0 {
                amount / month_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount).then(a.category.cmp(&b.category)));
    shares.truncate(limit);
    shares
}

pub(crate) fn stable_sum<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut values: Vec<f64> = amounts.into_iter().collect();
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}
