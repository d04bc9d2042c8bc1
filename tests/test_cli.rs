//! Runs the umlforge binary against the bundled example diagrams

use std::path::PathBuf;
use std::process::Command;

fn shop_diagram() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/examples/shop/diagram.json")
}

fn umlforge(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_umlforge"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    (output.status.success(), String::from_utf8(output.stdout).unwrap())
}

#[test]
fn test_inspect_prints_construction_order() {
    let diagram = shop_diagram();
    let (ok, stdout) = umlforge(&["inspect", "--diagram", diagram.to_str().unwrap()]);
    assert!(ok, "{}", stdout);

    let order_line = stdout
        .lines()
        .find(|l| l.starts_with("🧭 Service construction order: "))
        .unwrap();
    let position = |name: &str| {
        order_line
            .trim_start_matches("🧭 Service construction order: ")
            .split(" → ")
            .position(|s| s == name)
            .unwrap()
    };
    assert!(position("Customer") < position("Order"));
    assert!(position("Order") < position("OrderItem"));

    // Transitive: OrderItem reaches Customer through Order
    let needs = stdout
        .lines()
        .find(|l| l.starts_with("  OrderItem needs "))
        .unwrap();
    assert!(needs.contains("Customer"));
    assert!(needs.contains("Order"));
    assert!(!stdout.lines().any(|l| l.starts_with("  Customer needs ")));
}

#[test]
fn test_validate_rejects_missing_diagram() {
    let (ok, _) = umlforge(&["validate", "--diagram", "does/not/exist.json"]);
    assert!(!ok);
}
