mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn suggest_draws_on_titles_and_ocr_words() {
    let t = TestEnv::new();
    t.offline()
        .args(["suggest", "kenn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kennedy Johnson\n"))
        .stdout(predicate::str::contains("kennedy\n"))
        .stdout(predicate::str::contains("Fish Fry").not());
}

#[test]
fn suggest_json_is_capped_array() {
    let t = TestEnv::new();
    let out = t
        .offline()
        .args(["suggest", "e", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let items = v.as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.len() <= 10);
}

#[test]
fn blank_prefix_suggests_nothing() {
    let t = TestEnv::new();
    t.offline()
        .args(["suggest", "  "])
        .assert()
        .success()
        .stdout("");
}
