//! End-to-end tests for the bypass binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn bypass() -> Command {
    Command::cargo_bin("bypass").unwrap()
}

fn rule_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ============ check ============

#[test]
fn test_check_patterns() {
    bypass()
        .args(["check", "--plain", "-p", "*.example.com", "-p", "10.0.0.0/8"])
        .args(["www.example.com", "10.1.2.3:22", "rust-lang.org"])
        .assert()
        .success()
        .stdout(
            "www.example.com\tbypass\n10.1.2.3:22\tbypass\nrust-lang.org\tprocess\n",
        );
}

#[test]
fn test_check_reverse() {
    bypass()
        .args(["check", "--plain", "--reverse", "-p", "example.com"])
        .args(["example.com", "other.com"])
        .assert()
        .success()
        .stdout("example.com\tprocess\nother.com\tbypass\n");
}

#[test]
fn test_check_rule_file() {
    let rules = rule_file("reverse false\n# local\nlocalhost\n.example.com\n");
    bypass()
        .args(["check", "--plain", "-f"])
        .arg(rules.path())
        .args(["localhost:8080", "api.example.com", "example.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("localhost:8080\tbypass"))
        .stdout(predicate::str::contains("api.example.com\tbypass"))
        .stdout(predicate::str::contains("example.org\tprocess"));
}

#[test]
fn test_check_config_file() {
    let config = rule_file("[bypass]\npatterns = [\"192.168.0.0/16\"]\n");
    bypass()
        .args(["check", "--plain", "-c"])
        .arg(config.path())
        .args(["192.168.1.1", "8.8.8.8"])
        .assert()
        .success()
        .stdout("192.168.1.1\tbypass\n8.8.8.8\tprocess\n");
}

#[test]
fn test_check_empty_list_processes_everything() {
    bypass()
        .args(["check", "--plain", "--reverse", "example.com"])
        .assert()
        .success()
        .stdout("example.com\tprocess\n");
}

#[test]
fn test_check_invalid_pattern_fails() {
    bypass()
        .args(["check", "-p", "[broken", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pattern"));
}

#[test]
fn test_check_requires_address() {
    bypass().arg("check").assert().failure();
}

// ============ validate ============

#[test]
fn test_validate_good_file() {
    let rules = rule_file("reload 30s\nreverse true\n10.0.0.1\n10.0.0.0/8\n*.example.com\n");
    bypass()
        .arg("validate")
        .arg(rules.path())
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rules: 3"))
        .stdout(predicate::str::contains("Reversed: true"))
        .stdout(predicate::str::contains("Reload: 30s"))
        .stdout(predicate::str::contains("cidr 10.0.0.0/8"))
        .stdout(predicate::str::contains("domain *.example.com"));
}

#[test]
fn test_validate_strict_rejects_bad_directive() {
    let rules = rule_file("reload sometimes\nexample.com\n");
    bypass()
        .arg("validate")
        .arg(rules.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn test_validate_lenient_accepts_bad_directive() {
    let rules = rule_file("reload sometimes\nexample.com\n");
    bypass()
        .args(["-q", "validate", "--lenient"])
        .arg(rules.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Reload: load once"));
}

#[test]
fn test_validate_missing_file() {
    bypass()
        .args(["validate", "/nonexistent/bypass-rules.txt"])
        .assert()
        .failure();
}

// ============ watch ============

#[test]
fn test_watch_answers_stdin() {
    let rules = rule_file("reload 1h\n.example.com\n");
    bypass()
        .args(["watch", "--plain"])
        .arg(rules.path())
        .write_stdin("www.example.com:443\n\nrust-lang.org\n")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout("www.example.com:443\tbypass\nrust-lang.org\tprocess\n");
}

#[test]
fn test_watch_missing_file_fails() {
    bypass()
        .args(["watch", "/nonexistent/bypass-rules.txt"])
        .write_stdin("")
        .assert()
        .failure();
}

// ============ config / completions ============

#[test]
fn test_config_generate_and_validate() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bypass.toml");

    bypass()
        .args(["config", "generate", "-p", "localhost", "--reverse", "-o"])
        .arg(&output)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("reverse = true"));
    assert!(content.contains("localhost"));

    bypass()
        .args(["config", "validate"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Patterns: 1"));

    // Refuses to overwrite without --force
    bypass()
        .args(["config", "generate", "-o"])
        .arg(&output)
        .assert()
        .failure();
}

#[test]
fn test_config_validate_rejects_bad_pattern() {
    let config = rule_file("[bypass]\npatterns = [\"[oops\"]\n");
    bypass()
        .args(["config", "validate"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bypass.patterns[0]"));
}

#[test]
fn test_completions() {
    bypass()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bypass"));
}

#[test]
fn test_completions_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    bypass()
        .args(["completions", "fish", "-o"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("bypass.fish"));
    assert!(dir.path().join("bypass.fish").exists());
}
