//! End-to-end CLI behavior (spec §6.2), driven as a subprocess the way
//! `assert_cmd`/`predicates` are meant to be used rather than calling into
//! the binary's internals.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("ts2jsonschema").unwrap()
}

#[test]
fn converts_a_file_and_prints_a_schema_on_stdout() {
    let mut file = tempfile::Builder::new().suffix(".ts").tempfile().unwrap();
    writeln!(file, "export interface User {{ name: string; age?: number; }}").unwrap();

    cmd()
        .arg(file.path())
        .arg("--rootType=User")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"object\""))
        .stdout(predicate::str::contains("\"name\""));
}

#[test]
fn missing_file_fails_with_a_nonzero_exit_and_a_stderr_message() {
    cmd()
        .arg("/no/such/file/definitely-missing.ts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("conversion failed"));
}

#[test]
fn doctor_mode_always_succeeds_even_for_a_missing_file() {
    cmd()
        .arg("/no/such/file/definitely-missing.ts")
        .arg("--doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"readError\""))
        .stdout(predicate::str::contains("\"fileExists\": false"));
}

#[test]
fn doctor_mode_reports_a_successful_conversion_for_a_real_file() {
    let mut file = tempfile::Builder::new().suffix(".ts").tempfile().unwrap();
    writeln!(file, "export type Status = \"a\" | \"b\";").unwrap();

    cmd()
        .arg(file.path())
        .arg("--doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn version_flag_is_reachable_via_the_short_form() {
    cmd().arg("-v").assert().success().stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
