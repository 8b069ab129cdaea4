//! CLI integration tests for stash admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::Value;

use stash::store::{SqliteStore, Store};

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("stash").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }

    fn info_json(&self) -> Value {
        let output = self
            .cmd()
            .args([
                "admin",
                "info",
                "--data-dir",
                &self.data_dir_str(),
                "--json",
            ])
            .output()
            .expect("failed to run command");

        serde_json::from_slice(&output.stdout).expect("failed to parse JSON")
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::new(self.data_dir().join("stash.db")).expect("open db")
    }
}

fn add_user(ctx: &TestContext, name: &str, email: &str) -> i64 {
    ctx.cmd()
        .args([
            "admin",
            "user",
            "add",
            "--data-dir",
            &ctx.data_dir_str(),
            "--name",
            name,
            "--email",
            email,
            "--non-interactive",
        ])
        .assert()
        .success();

    let info = ctx.info_json();
    info["users"]
        .as_array()
        .expect("users not an array")
        .iter()
        .find(|u| u["email"] == email.to_lowercase())
        .expect("user not found")["id"]
        .as_i64()
        .expect("id not an integer")
}

#[test]
fn test_init_creates_database_and_token() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Admin token"));

    let token_path = ctx.data_dir().join(".admin_token");
    let token = std::fs::read_to_string(&token_path).expect("read admin token");
    assert!(token.starts_with("stash_"));
    assert!(ctx.data_dir().join("stash.db").exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&token_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.init()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_commands_require_init() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args(["admin", "info", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run 'stash admin init' first"));
}

#[test]
fn test_user_add_with_token() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args([
            "admin",
            "user",
            "add",
            "--data-dir",
            &ctx.data_dir_str(),
            "--name",
            "Alice",
            "--email",
            "alice@example.com",
            "--create-token",
            "--non-interactive",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token created: stash_"));

    let info = ctx.info_json();
    assert_eq!(info["users"].as_array().unwrap().len(), 1);
    let user_tokens: Vec<&Value> = info["tokens"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["is_admin"] == false)
        .collect();
    assert_eq!(user_tokens.len(), 1);
}

#[test]
fn test_user_add_requires_flags_non_interactive() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args([
            "admin",
            "user",
            "add",
            "--data-dir",
            &ctx.data_dir_str(),
            "--name",
            "Alice",
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email is required"));
}

#[test]
fn test_user_add_duplicate_email_fails() {
    let ctx = TestContext::new();
    ctx.init().success();
    add_user(&ctx, "Alice", "alice@example.com");

    ctx.cmd()
        .args([
            "admin",
            "user",
            "add",
            "--data-dir",
            &ctx.data_dir_str(),
            "--name",
            "Alice Again",
            "--email",
            "ALICE@example.com",
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_user_deactivate() {
    let ctx = TestContext::new();
    ctx.init().success();
    let user_id = add_user(&ctx, "Alice", "alice@example.com");

    ctx.cmd()
        .args([
            "admin",
            "user",
            "deactivate",
            "--data-dir",
            &ctx.data_dir_str(),
            "--user-id",
            &user_id.to_string(),
            "--non-interactive",
            "--yes",
        ])
        .assert()
        .success();

    let user = ctx.store().get_user(user_id).unwrap().unwrap();
    assert!(!user.active);
}

#[test]
fn test_token_create_and_revoke() {
    let ctx = TestContext::new();
    ctx.init().success();
    let user_id = add_user(&ctx, "Alice", "alice@example.com");

    ctx.cmd()
        .args([
            "admin",
            "token",
            "create",
            "--data-dir",
            &ctx.data_dir_str(),
            "--user-id",
            &user_id.to_string(),
            "--expires-days",
            "30",
            "--non-interactive",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token created for 'Alice'"));

    let tokens = ctx.store().list_user_tokens(user_id).unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].expires_at.is_some());

    ctx.cmd()
        .args([
            "admin",
            "token",
            "revoke",
            "--data-dir",
            &ctx.data_dir_str(),
            "--token-id",
            &tokens[0].id,
            "--non-interactive",
            "--yes",
        ])
        .assert()
        .success();

    assert!(ctx.store().list_user_tokens(user_id).unwrap().is_empty());
}

#[test]
fn test_token_create_unknown_user_fails() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args([
            "admin",
            "token",
            "create",
            "--data-dir",
            &ctx.data_dir_str(),
            "--user-id",
            "999",
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User not found"));
}

#[test]
fn test_file_add_and_list() {
    let ctx = TestContext::new();
    ctx.init().success();
    let user_id = add_user(&ctx, "Alice", "alice@example.com");

    ctx.cmd()
        .args([
            "admin",
            "file",
            "add",
            "--data-dir",
            &ctx.data_dir_str(),
            "--name",
            "report.pdf",
            "--owner-id",
            &user_id.to_string(),
            "--size-bytes",
            "512",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered file \"report.pdf\""));

    let output = ctx
        .cmd()
        .args([
            "admin",
            "file",
            "list",
            "--data-dir",
            &ctx.data_dir_str(),
            "--owner-id",
            &user_id.to_string(),
            "--json",
        ])
        .output()
        .expect("failed to run command");
    let files: Value = serde_json::from_slice(&output.stdout).expect("failed to parse JSON");
    let files = files.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "report.pdf");
    assert_eq!(files[0]["size_bytes"], 512);
    assert_eq!(files[0]["shares"], 0);
}

#[test]
fn test_file_add_unknown_owner_fails() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args([
            "admin",
            "file",
            "add",
            "--data-dir",
            &ctx.data_dir_str(),
            "--name",
            "report.pdf",
            "--owner-id",
            "42",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User not found"));
}

#[test]
fn test_info_reports_permission_catalog() {
    let ctx = TestContext::new();
    ctx.init().success();

    let info = ctx.info_json();
    let names: Vec<&str> = info["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["view", "edit"]);
}

#[test]
fn test_serve_requires_init() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args(["serve", "--data-dir", &ctx.data_dir_str(), "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server not initialized"));
}

#[test]
fn test_serve_rejects_bad_config_file() {
    let ctx = TestContext::new();
    let config = ctx.data_dir().join("stash.toml");
    std::fs::write(&config, "port = \"not a number\"\n").unwrap();

    ctx.cmd()
        .args(["serve", "--config", &config.to_string_lossy()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}
