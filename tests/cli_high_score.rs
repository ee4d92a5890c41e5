use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

use kwiz::highscore::{HighScoreStore, SqliteHighScoreStore};

fn kwiz(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("kwiz").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("KWIZ_LOG");
    cmd
}

#[test]
fn high_score_defaults_to_zero() {
    let home = tempdir().unwrap();
    kwiz(home.path())
        .arg("--high-score")
        .assert()
        .success()
        .stdout(predicate::eq("0\n"));
}

#[test]
fn high_score_prints_stored_value() {
    let home = tempdir().unwrap();
    let db = home
        .path()
        .join(".local")
        .join("state")
        .join("kwiz")
        .join("kwiz.db");
    let mut store = SqliteHighScoreStore::open(&db).unwrap();
    store.set(700).unwrap();
    drop(store);

    kwiz(home.path())
        .arg("--high-score")
        .assert()
        .success()
        .stdout(predicate::eq("700\n"));
}

#[test]
fn rejects_bad_difficulty() {
    let home = tempdir().unwrap();
    kwiz(home.path())
        .args(["--difficulty", "brutal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("easy, medium or hard"));
}

#[test]
fn refuses_to_run_without_a_tty() {
    let home = tempdir().unwrap();
    kwiz(home.path())
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stdin must be a tty"));
}
