use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn ledger_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bizledger"))
}

fn write_collection(data_dir: &std::path::Path, key: &str, payload: &str) {
    fs::create_dir_all(data_dir).unwrap();
    fs::write(data_dir.join(format!("{key}.json")), payload).unwrap();
}

fn seed_party_and_product(data_dir: &std::path::Path, role: &str, stock: i64) {
    write_collection(
        data_dir,
        "parties",
        &format!(
            r#"[{{"id": "p1", "name": "Acme", "role": "{role}", "mobile": "", "address": ""}}]"#
        ),
    );
    write_collection(
        data_dir,
        "products",
        &format!(
            r#"[{{"id": "prod1", "name": "Widget", "description": "", "price": 100.0, "stock": {stock}}}]"#
        ),
    );
}

#[test]
fn test_help() {
    ledger_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Small-business ledger"));
}

#[test]
fn test_version() {
    ledger_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bizledger"));
}

#[test]
fn test_party_add_and_list() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "party",
            "add",
            "--name",
            "Acme Traders",
            "--role",
            "customer",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved Acme Traders (customer)"));

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "party", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Traders"))
        .stdout(predicate::str::contains("customer"));
}

#[test]
fn test_party_add_rejects_bad_role() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "party",
            "add",
            "--name",
            "Acme",
            "--role",
            "vendor",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid party role 'vendor'"));
}

#[test]
fn test_quick_invoice_totals_and_stock() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    seed_party_and_product(&data_path, "customer", 10);

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "invoice",
            "quick",
            "--party",
            "p1",
            "--product",
            "prod1",
            "--qty",
            "2",
            "--discount",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created INV-"))
        .stdout(predicate::str::contains("Total:  226.00"))
        .stdout(predicate::str::contains("Status: UNPAID"));

    // Stock was decremented through the save path
    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8"));

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "invoice", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UNPAID"))
        .stdout(predicate::str::contains("Acme"));
}

#[test]
fn test_quick_invoice_insufficient_stock() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    seed_party_and_product(&data_path, "customer", 3);

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "invoice",
            "quick",
            "--party",
            "p1",
            "--product",
            "prod1",
            "--qty",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Not enough stock available for Widget. Current stock: 3",
        ));

    // Nothing was written
    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "invoice", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No invoices found."));
}

#[test]
fn test_quick_invoice_unknown_product() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    seed_party_and_product(&data_path, "customer", 10);

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "invoice",
            "quick",
            "--party",
            "p1",
            "--product",
            "nope",
            "--qty",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product 'nope' not found"));
}

#[test]
fn test_supplier_quick_invoice_increments_stock() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    seed_party_and_product(&data_path, "supplier", 0);

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "invoice",
            "quick",
            "--party",
            "p1",
            "--product",
            "prod1",
            "--qty",
            "5",
            "--tax",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:  500.00"));

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));
}

#[test]
fn test_txn_add_reconciles_linked_invoice() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    seed_party_and_product(&data_path, "customer", 10);
    write_collection(
        &data_path,
        "invoices",
        r#"[{
            "id": "inv1",
            "invoice_number": "INV-2608-001",
            "party_id": "p1",
            "date": "2026-08-01",
            "items": [],
            "subtotal": 500.0,
            "tax_percentage": 0.0,
            "tax_amount": 0.0,
            "discount": 0.0,
            "total": 500.0,
            "paid_amount": 0.0,
            "status": "unpaid"
        }]"#,
    );

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "txn",
            "add",
            "--party",
            "p1",
            "--kind",
            "receipt",
            "--amount",
            "200",
            "--invoice",
            "inv1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded receipt of 200.00 (cash)"))
        .stdout(predicate::str::contains(
            "Reconciled INV-2608-001: paid 200.00 of 500.00 (PARTIAL)",
        ));

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "txn",
            "add",
            "--party",
            "p1",
            "--kind",
            "receipt",
            "--amount",
            "300",
            "--invoice",
            "inv1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reconciled INV-2608-001: paid 500.00 of 500.00 (PAID)",
        ));

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "invoice", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PAID"));
}

#[test]
fn test_txn_add_rejects_non_positive_amount() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    seed_party_and_product(&data_path, "customer", 10);

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "txn",
            "add",
            "--party",
            "p1",
            "--kind",
            "receipt",
            "--amount",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_stock_report() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    write_collection(
        &data_path,
        "products",
        r#"[
            {"id": "a", "name": "Low Widget", "description": "", "price": 10.0, "stock": 4},
            {"id": "b", "name": "Full Widget", "description": "", "price": 10.0, "stock": 50},
            {"id": "c", "name": "Gone Widget", "description": "", "price": 10.0, "stock": 0}
        ]"#,
    );

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "stock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Low Widget"))
        .stdout(predicate::str::contains("Gone Widget"))
        .stdout(predicate::str::contains("Full Widget").not());

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "stock", "--out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gone Widget"))
        .stdout(predicate::str::contains("Low Widget").not());
}

#[test]
fn test_stock_history() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");
    seed_party_and_product(&data_path, "customer", 10);

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "invoice",
            "quick",
            "--party",
            "p1",
            "--product",
            "prod1",
            "--qty",
            "4",
        ])
        .assert()
        .success();

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "product",
            "history",
            "prod1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stock history for Widget"))
        .stdout(predicate::str::contains("-4"))
        .stdout(predicate::str::contains("INV-"));
}

#[test]
fn test_next_number() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "invoice", "next-number"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-"))
        .stdout(predicate::str::contains("-001"));
}

#[test]
fn test_business_defaults_and_set() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "business", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("My Business"));

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "business",
            "set",
            "--name",
            "Acme Traders",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved business profile"));

    ledger_cmd()
        .args(["-D", data_path.to_str().unwrap(), "business", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Traders"));
}

#[test]
fn test_product_adjust_unknown_product() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data");

    ledger_cmd()
        .args([
            "-D",
            data_path.to_str().unwrap(),
            "product",
            "adjust",
            "ghost",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product 'ghost' not found"));
}
