#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

mod common;

#[test]
fn test_callback_reloads_credentials_from_previous_run() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: initiate payment for a Małopolska order
    let orders = common::orders_csv(&["1,PL-MA,", "2,PL-XX,"]);
    let output1 = Command::new(cargo_bin!("credential-router"))
        .env_remove("RUST_LOG")
        .args(["--config", common::CONFIG_FIXTURE, "--db-path"])
        .arg(&db_path)
        .arg("checkout")
        .arg(orders.path())
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,MA,111,redirect,"));

    // 2. Second run: the callback only carries the order id
    let output2 = Command::new(cargo_bin!("credential-router"))
        .env_remove("RUST_LOG")
        .args(["--config", common::CONFIG_FIXTURE, "--db-path"])
        .arg(&db_path)
        .args(["callback", "--order-id", "1"])
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains("order 1 confirmed with merchant 111"));

    // 3. Third run: the callback carries the provider session id in its body
    let session = stdout1
        .lines()
        .find(|line| line.starts_with("2,"))
        .and_then(|line| line.rsplit('/').next())
        .expect("missing redirect for order 2")
        .to_string();
    let body = format!(r#"{{"sessionId": "{}"}}"#, session);
    let output3 = Command::new(cargo_bin!("credential-router"))
        .env_remove("RUST_LOG")
        .args(["--config", common::CONFIG_FIXTURE, "--db-path"])
        .arg(&db_path)
        .args(["callback", "--body", &body])
        .output()
        .expect("Failed to execute command");
    assert!(output3.status.success());
    let stdout3 = String::from_utf8_lossy(&output3.stdout);
    assert!(stdout3.contains("order 2 confirmed with merchant 000"));
}
