use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const HEADER: &str = "date,description,merchant_name,amount,type,category,tags,notes";

fn hq(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hqledger").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn setup() -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("books");
    hq(home.path())
        .args(["init", "--data-dir", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized hqledger"));
    home
}

fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("{HEADER}\n{body}")).unwrap();
    path
}

#[test]
fn import_tags_rows_with_matching_rule() {
    let home = setup();
    hq(home.path())
        .args(["rules", "add", "--keyword", "Amazon", "--category", "Shopping", "--tags", "online"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added rule 1"));

    let csv = write_csv(
        home.path(),
        "jan.csv",
        "2024-01-05,Amazon Purchase,Amazon,45.99,expense,,,\n2024-01-06,Rent,,1500,expense,,,\n",
    );
    hq(home.path())
        .args(["import", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 transactions, 1 tagged"));

    hq(home.path())
        .args(["transactions", "--category", "Shopping"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amazon Purchase"))
        .stdout(predicate::str::contains("online"))
        .stdout(predicate::str::contains("Rent").not());

    hq(home.path())
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shopping"));
}

#[test]
fn transactions_listing_shows_notes() {
    let home = setup();
    let csv = write_csv(
        home.path(),
        "notes.csv",
        "2024-01-03,Client payment,,2500,income,Sales,,January retainer\n",
    );
    hq(home.path()).args(["import", csv.to_str().unwrap()]).assert().success();

    hq(home.path())
        .arg("transactions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes"))
        .stdout(predicate::str::contains("January retainer"));
}

#[test]
fn reimporting_same_file_is_reported() {
    let home = setup();
    let csv = write_csv(home.path(), "jan.csv", "2024-01-05,Coffee,,4.50,expense,,,\n");
    hq(home.path()).args(["import", csv.to_str().unwrap()]).assert().success();
    hq(home.path())
        .args(["import", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
}

#[test]
fn header_only_csv_fails() {
    let home = setup();
    let csv = write_csv(home.path(), "empty.csv", "");
    hq(home.path())
        .args(["import", csv.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn non_numeric_amount_fails_and_writes_nothing() {
    let home = setup();
    let csv = write_csv(
        home.path(),
        "bad.csv",
        "2024-01-05,Coffee,,4.50,expense,,,\n2024-01-06,Tea,,abc,expense,,,\n",
    );
    hq(home.path())
        .args(["import", csv.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3: amount 'abc' is not a number"));
    hq(home.path())
        .arg("transactions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions (0)"));
}

#[test]
fn inverted_bounds_rejected() {
    let home = setup();
    hq(home.path())
        .args(["rules", "add", "--min", "500", "--max", "100", "--category", "Big"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn deleting_twice_is_not_an_error() {
    let home = setup();
    hq(home.path())
        .args(["rules", "add", "--merchant", "Uber", "--category", "Travel"])
        .assert()
        .success();
    hq(home.path())
        .args(["rules", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted rule 1"));
    hq(home.path())
        .args(["rules", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));
}

#[test]
fn sales_role_cannot_touch_accounting() {
    let home = setup();
    hq(home.path())
        .args(["--role", "sales", "rules", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));
    hq(home.path())
        .args(["--role", "developer", "rules", "list"])
        .assert()
        .success();
}

#[test]
fn apply_uses_chosen_policy() {
    let home = setup();
    let csv = write_csv(home.path(), "jan.csv", "2024-01-05,Amazon Purchase,Amazon,45.99,expense,,,\n");
    hq(home.path()).args(["import", csv.to_str().unwrap()]).assert().success();
    hq(home.path())
        .args(["rules", "add", "--keyword", "Amazon", "--category", "First"])
        .assert()
        .success();
    hq(home.path())
        .args(["rules", "add", "--keyword", "Amazon", "--category", "Second"])
        .assert()
        .success();

    hq(home.path())
        .args(["--policy", "last-match", "rules", "apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 tagged, 0 unmatched"));
    hq(home.path())
        .args(["transactions", "--category", "Second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amazon Purchase"));
}

#[test]
fn cashflow_report_lists_months() {
    let home = setup();
    let csv = write_csv(
        home.path(),
        "q1.csv",
        "2024-01-05,Invoice,,1000,income,,,\n2024-02-06,Rent,,400,expense,,,\n",
    );
    hq(home.path()).args(["import", csv.to_str().unwrap()]).assert().success();
    hq(home.path())
        .args(["report", "cashflow", "--year", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01"))
        .stdout(predicate::str::contains("2024-02"))
        .stdout(predicate::str::contains("$1,000.00"));
}
