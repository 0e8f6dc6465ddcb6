mod common;

use common::{at, open_at, setup_manager};
use kharcha_core::core::budget_monitor::BudgetStatus;
use kharcha_core::ledger::{Budget, BudgetPeriod, Category, Expense, NotificationKind};

fn spend(manager: &mut kharcha_core::core::LedgerManager, amount: f64, category: Category, day: u32) {
    let account = manager.active_account().unwrap().id;
    let date = at(2024, 3, day);
    manager
        .add_expense(Expense::new(account, amount, category, date, ""))
        .unwrap();
}

#[test]
fn thresholds_raise_one_alert_each_per_month() {
    let (mut manager, base) = setup_manager(at(2024, 3, 20));
    let account = manager.active_account().unwrap().id;
    manager
        .add_budget(Budget::new(account, Category::Groceries, 1000.0, BudgetPeriod::Monthly))
        .unwrap();

    spend(&mut manager, 850.0, Category::Groceries, 5);
    let alerts = &manager.last_refresh().alerts;
    assert_eq!(alerts.len(), 1);
    assert_eq!(
        alerts[0].message,
        "You're approaching your Groceries budget for this month (85%)"
    );

    spend(&mut manager, 10.0, Category::Groceries, 6);
    assert!(manager.last_refresh().alerts.is_empty());

    spend(&mut manager, 200.0, Category::Groceries, 7);
    let alerts = &manager.last_refresh().alerts;
    assert_eq!(alerts.len(), 1);
    assert_eq!(
        alerts[0].message,
        "You've exceeded your Groceries budget for this month! (₹1060.00/₹1000.00)"
    );
    assert!(alerts[0].over_budget());
    assert_eq!(alerts[0].remaining(), -60.0);

    let kinds: Vec<_> = manager.notifications().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, [NotificationKind::Error, NotificationKind::Warning]);
    manager.save().unwrap();

    let reopened = open_at(&base, at(2024, 3, 25));
    assert!(reopened.last_refresh().alerts.is_empty());
    assert_eq!(reopened.notifications().len(), 2);
}

#[test]
fn a_new_month_starts_clean() {
    let (mut manager, base) = setup_manager(at(2024, 3, 20));
    let account = manager.active_account().unwrap().id;
    manager
        .add_budget(Budget::new(account, Category::Shopping, 500.0, BudgetPeriod::Monthly))
        .unwrap();
    spend(&mut manager, 450.0, Category::Shopping, 2);
    assert_eq!(manager.last_refresh().alerts.len(), 1);
    manager.save().unwrap();

    let mut april = open_at(&base, at(2024, 4, 3));
    assert!(april.last_refresh().alerts.is_empty());
    april
        .add_expense(Expense::new(account, 420.0, Category::Shopping, at(2024, 4, 2), "Shoes"))
        .unwrap();
    let alerts = &april.last_refresh().alerts;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].key.period.month, 4);
}

#[test]
fn clearing_notifications_allows_alerts_again_but_reading_does_not() {
    let (mut manager, _base) = setup_manager(at(2024, 3, 20));
    let account = manager.active_account().unwrap().id;
    manager
        .add_budget(Budget::new(account, Category::Travel, 2000.0, BudgetPeriod::Monthly))
        .unwrap();
    spend(&mut manager, 1700.0, Category::Travel, 10);
    assert_eq!(manager.unread_count(), 1);

    assert_eq!(manager.mark_all_notifications_read(), 1);
    assert!(manager.refresh().alerts.is_empty());

    assert_eq!(manager.clear_notifications(), 1);
    let again = manager.refresh().clone();
    assert_eq!(again.alerts.len(), 1);
    assert_eq!(manager.unread_count(), 1);
}

#[test]
fn custom_thresholds_and_yearly_budgets_show_in_progress() {
    let (mut manager, _base) = setup_manager(at(2024, 3, 20));
    let account = manager.active_account().unwrap().id;
    manager
        .add_budget(
            Budget::new(account, Category::Entertainment, 1000.0, BudgetPeriod::Monthly)
                .with_threshold(50.0),
        )
        .unwrap();
    manager
        .add_budget(Budget::new(account, Category::Entertainment, 2000.0, BudgetPeriod::Yearly))
        .unwrap();
    manager
        .add_expense(Expense::new(
            account,
            1500.0,
            Category::Entertainment,
            at(2024, 1, 15),
            "Concert",
        ))
        .unwrap();
    spend(&mut manager, 600.0, Category::Entertainment, 1);

    let alerts = &manager.last_refresh().alerts;
    assert_eq!(alerts.len(), 1, "yearly budgets never alert");
    assert!(!alerts[0].over_budget());

    let progress = manager.budget_progress();
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].period, BudgetPeriod::Monthly);
    assert_eq!(progress[0].spent, 600.0);
    assert_eq!(progress[0].status, BudgetStatus::Warning);
    assert_eq!(progress[1].period, BudgetPeriod::Yearly);
    assert_eq!(progress[1].spent, 2100.0);
    assert_eq!(progress[1].status, BudgetStatus::Exceeded);
    assert_eq!(progress[1].remaining, -100.0);
}

#[test]
fn budgets_of_other_accounts_stay_quiet() {
    let (mut manager, _base) = setup_manager(at(2024, 3, 20));
    let business = manager.ledger().accounts[1].id;
    manager
        .add_budget(Budget::new(business, Category::Utilities, 100.0, BudgetPeriod::Monthly))
        .unwrap();
    manager
        .add_expense(Expense::new(business, 150.0, Category::Utilities, at(2024, 3, 3), ""))
        .unwrap();
    assert!(manager.last_refresh().alerts.is_empty());

    manager.switch_account(business).unwrap();
    assert_eq!(manager.last_refresh().alerts.len(), 1);
}
