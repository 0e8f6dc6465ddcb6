use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use std::path::Path;

const NOW: &str = "2024-03-15T12:00:00Z";

fn shell(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kharcha_cli").unwrap();
    cmd.env("KHARCHA_HOME", home)
        .env("KHARCHA_NOW", NOW)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn budget_warning_is_reported_and_state_persists() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
expense add 850 Groceries --date 2024-03-10 --desc \"Weekly shop\"
budget set groceries 1000
budgets
exit
";
    shell(home.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Added Weekly shop ₹850.00")
                .and(contains("Monthly budget for Groceries set"))
                .and(contains("You're approaching your Groceries budget for this month (85%)"))
                .and(contains("warning")),
        );

    assert!(home.path().join("ledgers").join("main.json").exists());

    shell(home.path())
        .write_stdin("expenses\nsummary\n")
        .assert()
        .success()
        .stdout(
            contains("Weekly shop")
                .and(contains("Total spent:        ₹850.00"))
                .and(contains("approaching").not()),
        );
}

#[test]
fn recurring_expenses_are_generated_up_to_now() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
expense add 100 Transportation --date 2024-03-12 --desc Metro --every daily
recurring
notifications
";
    shell(home.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Generated 3 recurring expense(s)")
                .and(contains("next 2024-03-16"))
                .and(contains("Recurring transactions have been processed (3 new)")),
        );
}

#[test]
fn accounts_can_be_created_and_switched() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
account add \"Travel Fund\" savings
account use \"travel fund\"
accounts
account rm Business
accounts
";
    shell(home.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("Account `Travel Fund` created")
                .and(contains("* Travel Fund (Savings"))
                .and(contains("Account `Business` deleted")),
        );
}

#[test]
fn bad_input_is_reported_without_stopping_the_script() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
expense add 10 Snacks
frobnicate
expense add 12 \"Food & Dining
expense add -5 Other
expense add 12abc Other
expense add 42 Other --desc Tea
expenses
";
    shell(home.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains("unknown category `Snacks`")
                .and(contains("unknown command `frobnicate`"))
                .and(contains("could not parse input"))
                .and(contains("invalid amount `12abc`"))
                .and(contains("Added Tea ₹42.00"))
                .and(contains("₹12.00").not()),
        );
}

#[test]
fn invalid_clock_fails_fast() {
    let home = tempfile::tempdir().unwrap();
    shell(home.path())
        .env("KHARCHA_NOW", "yesterday")
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stderr(contains("invalid KHARCHA_NOW value `yesterday`"));
}
