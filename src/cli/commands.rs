//! Command handlers for the kharcha shell.

use std::collections::HashMap;

use crate::core::budget_monitor::BudgetStatus;
use crate::ledger::{
    Account, AccountKind, Budget, BudgetPeriod, Category, DraftAmount, ExpenseDraft, Frequency,
};

use super::context::{
    resolve_prefix, short_id, CommandError, CommandResult, LoopControl, ShellContext,
};
use super::output::{self, MessageKind};

const COMMANDS: &[(&str, &str)] = &[
    ("accounts", "List accounts; the active one is marked with *"),
    ("account add <name> [type]", "Create an account (personal, business, savings, other)"),
    ("account use <name>", "Switch the active account"),
    ("account rename <name> <new name>", "Rename an account"),
    ("account rm <name>", "Delete an account with its expenses and budgets"),
    (
        "expense add <amount> <category> [--date D] [--desc T] [--every F]",
        "Record an expense; --every makes it recurring (daily, weekly, monthly, yearly)",
    ),
    ("expense rm <id>", "Delete an expense by id prefix"),
    ("expenses", "List expenses of the active account"),
    ("recurring", "List recurring expenses with their next date"),
    (
        "budget set <category> <limit> [monthly|yearly] [--threshold N]",
        "Create or update a budget",
    ),
    ("budget rm <category> [monthly|yearly]", "Delete a budget"),
    ("budgets", "Show budget usage for the current period"),
    ("process", "Generate owed recurring expenses and check budgets"),
    ("notifications", "List notifications, newest first"),
    ("read [id|all]", "Mark notifications as read"),
    ("clear", "Delete all notifications"),
    ("summary", "Spending overview"),
    ("backups", "List saved backups"),
    ("restore <backup>", "Restore a backup"),
    ("save", "Write the ledger to disk"),
    ("help", "Show this help"),
    ("exit", "Leave the shell"),
];

pub(crate) fn command_names() -> Vec<&'static str> {
    COMMANDS
        .iter()
        .filter_map(|(usage, _)| usage.split_whitespace().next())
        .collect()
}

pub(crate) fn dispatch(
    context: &mut ShellContext,
    command: &str,
    args: &[&str],
) -> Result<LoopControl, CommandError> {
    match command {
        "help" => help(),
        "accounts" => list_accounts(context),
        "account" => account(context, args),
        "expense" => expense(context, args),
        "expenses" => list_expenses(context),
        "recurring" => list_recurring(context),
        "budget" => budget(context, args),
        "budgets" => list_budgets(context),
        "process" => process(context),
        "notifications" => list_notifications(context),
        "read" => read(context, args),
        "clear" => clear(context),
        "summary" => summary(context),
        "backups" => list_backups(context),
        "restore" => restore(context, args),
        "save" => save(context),
        "exit" | "quit" => return Ok(LoopControl::Exit),
        other => Err(unknown_command(other)),
    }?;
    Ok(LoopControl::Continue)
}

fn unknown_command(name: &str) -> CommandError {
    let mut candidates: Vec<&str> = command_names()
        .into_iter()
        .filter(|candidate| !name.is_empty() && candidate.starts_with(name))
        .collect();
    candidates.dedup();
    match candidates.as_slice() {
        [] => CommandError::InvalidArguments(format!("unknown command `{name}`")),
        _ => CommandError::InvalidArguments(format!(
            "unknown command `{name}` (did you mean {}?)",
            candidates.join(" or ")
        )),
    }
}

fn help() -> CommandResult {
    output::section("Commands");
    for (usage, description) in COMMANDS {
        output::line(format!("{usage:<66} {description}"));
    }
    Ok(())
}

fn list_accounts(context: &ShellContext) -> CommandResult {
    output::section("Accounts");
    let active = context.manager.active_account().map(|account| account.id);
    for account in &context.manager.ledger().accounts {
        let marker = if Some(account.id) == active { "*" } else { " " };
        output::line(format!(
            "{marker} {} ({}, {})",
            account.name, account.kind, account.color
        ));
    }
    Ok(())
}

fn account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["add", name, rest @ ..] => {
            let kind = match rest.first() {
                Some(raw) => raw
                    .parse::<AccountKind>()
                    .map_err(CommandError::InvalidArguments)?,
                None => AccountKind::Personal,
            };
            context.manager.add_account(Account::new(*name, kind))?;
            output::success(format!("Account `{}` created", name.trim()));
            Ok(())
        }
        ["use", name] => {
            let id = account_id(context, name)?;
            context.manager.switch_account(id)?;
            output::success(format!("Switched to `{name}`"));
            context.report_refresh(context.manager.last_refresh());
            Ok(())
        }
        ["rename", name, new_name] => {
            let id = account_id(context, name)?;
            let current = context
                .manager
                .ledger()
                .account(id)
                .cloned()
                .ok_or_else(|| CommandError::Message(format!("account `{name}` not found")))?;
            let changes = Account {
                name: new_name.to_string(),
                ..current
            };
            context.manager.edit_account(id, changes)?;
            output::success(format!("Account `{name}` renamed to `{new_name}`"));
            Ok(())
        }
        ["rm", name] => {
            let id = account_id(context, name)?;
            let removed = context.manager.remove_account(id)?;
            output::success(format!("Account `{}` deleted", removed.name));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: account add|use|rename|rm <name>".into(),
        )),
    }
}

fn account_id(context: &ShellContext, name: &str) -> Result<uuid::Uuid, CommandError> {
    context
        .manager
        .ledger()
        .account_by_name(name)
        .map(|account| account.id)
        .ok_or_else(|| CommandError::Message(format!("account `{name}` not found")))
}

fn expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.split_first() {
        Some((&"add", rest)) => add_expense(context, rest),
        Some((&"rm", [prefix])) => {
            let ids: Vec<_> = context.manager.expenses().iter().map(|e| e.id).collect();
            let id = resolve_prefix(prefix, ids, "expense")?;
            let removed = context.manager.remove_expense(id)?;
            output::success(format!(
                "Deleted {} {}",
                removed.display_label(),
                context.money(removed.amount)
            ));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: expense add <amount> <category> [--date D] [--desc T] [--every F] | expense rm <id>"
                .into(),
        )),
    }
}

fn add_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positionals, flags) = split_flags(args)?;
    let [amount, category] = positionals.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: expense add <amount> <category> [--date D] [--desc T] [--every F]".into(),
        ));
    };
    let amount = parse_number(amount, "amount")?;
    let category = parse_category(category)?;
    let frequency = flags
        .get("every")
        .map(|raw| raw.parse::<Frequency>())
        .transpose()
        .map_err(CommandError::InvalidArguments)?;
    let account_id = context
        .manager
        .active_account()
        .map(|account| account.id)
        .ok_or_else(|| CommandError::Message("no active account".into()))?;

    let draft = ExpenseDraft {
        amount: Some(DraftAmount::Number(amount)),
        category: Some(category.label().to_string()),
        date: flags.get("date").map(|date| date.to_string()),
        description: flags.get("desc").map(|desc| desc.to_string()),
        receipt_text: None,
    };
    let mut expense = draft.into_expense(account_id, context.manager.now())?;
    if let Some(frequency) = frequency {
        expense = expense.with_frequency(frequency);
    }
    let label = expense.display_label();
    let amount = expense.amount;
    let id = context.manager.add_expense(expense)?;
    output::success(format!(
        "Added {} {} [{}]",
        label,
        context.money(amount),
        short_id(id)
    ));
    context.report_refresh(context.manager.last_refresh());
    Ok(())
}

fn list_expenses(context: &ShellContext) -> CommandResult {
    output::section("Expenses");
    let expenses = context.manager.expenses();
    if expenses.is_empty() {
        output::info("No expenses recorded.");
        return Ok(());
    }
    for expense in expenses {
        let recurring = match expense.frequency {
            Some(frequency) if expense.recurring => format!(" ({frequency})"),
            _ => String::new(),
        };
        output::line(format!(
            "{} {} {:>12} {:<18} {}{}",
            short_id(expense.id),
            expense.date.format("%Y-%m-%d"),
            context.money(expense.amount),
            expense.category.label(),
            expense.description,
            recurring
        ));
    }
    Ok(())
}

fn list_recurring(context: &ShellContext) -> CommandResult {
    output::section("Recurring expenses");
    let templates = context.manager.recurring();
    if templates.is_empty() {
        output::info("No recurring expenses.");
        return Ok(());
    }
    for entry in templates {
        let template = entry.template;
        let frequency = template
            .frequency
            .map(|frequency| frequency.to_string())
            .unwrap_or_else(|| "missing frequency".into());
        let next = entry
            .next
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into());
        output::line(format!(
            "{} {:<24} {:>12} {:<8} next {}",
            short_id(template.id),
            template.display_label(),
            context.money(template.amount),
            frequency,
            next
        ));
    }
    Ok(())
}

fn budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.split_first() {
        Some((&"set", rest)) => set_budget(context, rest),
        Some((&"rm", rest)) if !rest.is_empty() && rest.len() <= 2 => {
            let category = parse_category(rest[0])?;
            let period = parse_period(rest.get(1).copied())?;
            let id = find_budget(context, category, period)
                .ok_or_else(|| CommandError::Message(format!("no {period} budget for {category}")))?;
            context.manager.remove_budget(id)?;
            output::success(format!("{period} budget for {category} deleted"));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: budget set <category> <limit> [monthly|yearly] [--threshold N] | budget rm <category> [period]"
                .into(),
        )),
    }
}

fn set_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positionals, flags) = split_flags(args)?;
    let (category, limit, period) = match positionals.as_slice() {
        [category, limit] => (*category, *limit, None),
        [category, limit, period] => (*category, *limit, Some(*period)),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: budget set <category> <limit> [monthly|yearly] [--threshold N]".into(),
            ))
        }
    };
    let category = parse_category(category)?;
    let limit = parse_number(limit, "limit")?;
    let period = parse_period(period)?;
    let account_id = context
        .manager
        .active_account()
        .map(|account| account.id)
        .ok_or_else(|| CommandError::Message("no active account".into()))?;

    let mut budget = Budget::new(account_id, category, limit, period);
    if let Some(raw) = flags.get("threshold") {
        budget = budget.with_threshold(parse_number(raw, "threshold")?);
    }
    match find_budget(context, category, period) {
        Some(id) => {
            context.manager.update_budget(id, budget)?;
            output::success(format!("{period} budget for {category} updated"));
        }
        None => {
            context.manager.add_budget(budget)?;
            output::success(format!("{period} budget for {category} set"));
        }
    }
    context.report_refresh(context.manager.last_refresh());
    Ok(())
}

fn find_budget(context: &ShellContext, category: Category, period: BudgetPeriod) -> Option<uuid::Uuid> {
    context
        .manager
        .budgets()
        .into_iter()
        .find(|budget| budget.category == category && budget.period == period)
        .map(|budget| budget.id)
}

fn list_budgets(context: &ShellContext) -> CommandResult {
    output::section("Budgets");
    let progress = context.manager.budget_progress();
    if progress.is_empty() {
        output::info("No budgets set.");
        return Ok(());
    }
    for entry in progress {
        let percent = entry
            .percent_used
            .map(|percent| format!("{percent:.0}%"))
            .unwrap_or_else(|| "n/a".into());
        let text = format!(
            "{:<18} {:<8} {} / {} ({}) {}",
            entry.category.label(),
            entry.period,
            context.money(entry.spent),
            context.money(entry.limit),
            percent,
            status_label(entry.status)
        );
        match entry.status {
            BudgetStatus::OnTrack => output::line(text),
            BudgetStatus::Warning => output::warning(text),
            BudgetStatus::Exceeded => output::error(text),
        }
    }
    Ok(())
}

fn status_label(status: BudgetStatus) -> &'static str {
    match status {
        BudgetStatus::OnTrack => "on track",
        BudgetStatus::Warning => "warning",
        BudgetStatus::Exceeded => "exceeded",
    }
}

fn process(context: &mut ShellContext) -> CommandResult {
    let report = context.manager.refresh().clone();
    if report.is_quiet() {
        output::info("Nothing to process.");
    } else {
        context.report_refresh(&report);
    }
    Ok(())
}

fn list_notifications(context: &ShellContext) -> CommandResult {
    output::section(format!(
        "Notifications ({} unread)",
        context.manager.unread_count()
    ));
    let notifications = context.manager.notifications();
    if notifications.is_empty() {
        output::info("No notifications.");
        return Ok(());
    }
    for notification in notifications {
        let marker = if notification.read { " " } else { "*" };
        output::tinted_line(
            MessageKind::from(notification.kind),
            format!(
                "{marker} {} {} [{}] {}",
                short_id(notification.id),
                notification.created_at.format("%Y-%m-%d %H:%M"),
                notification.kind,
                notification.message
            ),
        );
    }
    Ok(())
}

fn read(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["all"] => {
            let changed = context.manager.mark_all_notifications_read();
            output::success(format!("{changed} notification(s) marked as read"));
        }
        [prefix] => {
            let ids: Vec<_> = context.manager.notifications().iter().map(|n| n.id).collect();
            let id = resolve_prefix(prefix, ids, "notification")?;
            context.manager.mark_notification_read(id)?;
            output::success("Notification marked as read");
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: read [id|all]".into(),
            ))
        }
    }
    Ok(())
}

fn clear(context: &mut ShellContext) -> CommandResult {
    let removed = context.manager.clear_notifications();
    output::success(format!("{removed} notification(s) cleared"));
    Ok(())
}

fn summary(context: &ShellContext) -> CommandResult {
    let summary = context.manager.summary();
    let account = context
        .manager
        .active_account()
        .map(|account| account.name.clone())
        .unwrap_or_default();
    output::section(format!("Summary for {account}"));
    output::line(format!("Total spent:        {}", context.money(summary.total)));
    output::line(format!("Expenses recorded:  {}", summary.count));
    output::line(format!("Average expense:    {}", context.money(summary.average)));
    output::line(format!(
        "Last {} days:       {}",
        summary.recent_days,
        context.money(summary.recent_total)
    ));
    match context.manager.month_over_month_change() {
        Some(change) => output::line(format!("Change vs last month: {change:+.1}%")),
        None => output::line("Change vs last month: n/a"),
    }
    let top = context.manager.top_categories(3);
    if !top.is_empty() {
        output::line("Top categories this month:");
        for share in top {
            output::line(format!(
                "  {:<18} {:>12} ({:.0}%)",
                share.category.label(),
                context.money(share.amount),
                share.share
            ));
        }
    }
    Ok(())
}

fn list_backups(context: &ShellContext) -> CommandResult {
    output::section("Backups");
    let backups = context.manager.list_backups()?;
    if backups.is_empty() {
        output::info("No backups yet.");
    }
    for backup in backups {
        output::line(backup);
    }
    Ok(())
}

fn restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [backup] = args else {
        return Err(CommandError::InvalidArguments("usage: restore <backup>".into()));
    };
    let report = context.manager.restore_backup(backup)?.clone();
    output::success(format!("Restored `{backup}`"));
    context.report_refresh(&report);
    Ok(())
}

fn save(context: &mut ShellContext) -> CommandResult {
    context.manager.save()?;
    output::success(format!("Ledger `{}` saved", context.manager.name()));
    Ok(())
}

fn parse_category(raw: &str) -> Result<Category, CommandError> {
    Category::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|category| category.label()).collect();
        CommandError::InvalidArguments(format!(
            "unknown category `{raw}` (expected one of: {})",
            known.join(", ")
        ))
    })
}

fn parse_period(raw: Option<&str>) -> Result<BudgetPeriod, CommandError> {
    match raw {
        Some(raw) => raw
            .parse::<BudgetPeriod>()
            .map_err(CommandError::InvalidArguments),
        None => Ok(BudgetPeriod::Monthly),
    }
}

/// Plain decimals only; exponents, `inf` and trailing text are rejected.
fn parse_number(raw: &str, field: &str) -> Result<f64, CommandError> {
    let trimmed = raw.trim();
    let plain = trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .enumerate()
            .all(|(index, c)| c.is_ascii_digit() || c == '.' || (c == '-' && index == 0));
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|_| plain)
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid {field} `{raw}`")))
}

/// Separates `--name value` pairs from positional arguments.
fn split_flags<'a>(args: &[&'a str]) -> Result<(Vec<&'a str>, HashMap<&'a str, &'a str>), CommandError> {
    let mut positionals = Vec::new();
    let mut flags = HashMap::new();
    let mut iter = args.iter();
    while let Some(&arg) = iter.next() {
        match arg.strip_prefix("--") {
            Some(name) => {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("--{name} needs a value"))
                })?;
                flags.insert(name, *value);
            }
            None => positionals.push(arg),
        }
    }
    Ok((positionals, flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_split_from_positionals() {
        let (positionals, flags) =
            split_flags(&["250", "Groceries", "--desc", "Weekly shop", "--every", "weekly"]).unwrap();
        assert_eq!(positionals, ["250", "Groceries"]);
        assert_eq!(flags["desc"], "Weekly shop");
        assert_eq!(flags["every"], "weekly");
        assert!(split_flags(&["--date"]).is_err());
    }

    #[test]
    fn numbers_must_be_plain_decimals() {
        assert_eq!(parse_number(" 249.50 ", "amount").unwrap(), 249.5);
        assert_eq!(parse_number("-5", "amount").unwrap(), -5.0);
        for raw in ["12abc", "1e3", "inf", "NaN", "1-2", ""] {
            assert!(parse_number(raw, "amount").is_err(), "{raw} accepted");
        }
    }

    #[test]
    fn categories_must_be_known() {
        assert_eq!(parse_category("food & dining").unwrap(), Category::FoodAndDining);
        assert!(parse_category("Snacks").is_err());
    }

    #[test]
    fn every_command_has_a_name() {
        let names = command_names();
        assert!(names.contains(&"expense"));
        assert!(names.contains(&"exit"));
    }

    #[test]
    fn unknown_commands_suggest_prefixed_names() {
        let message = unknown_command("expe").to_string();
        assert!(message.contains("expense or expenses"), "{message}");
        assert_eq!(unknown_command("zzz").to_string(), "unknown command `zzz`");
    }
}
