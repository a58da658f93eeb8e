//! Integration tests for the secrets-vault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master password is supplied through `SECRETS_VAULT_PASSWORD`, and each
//! test drops a `.secrets-vault.toml` with cheap Argon2 settings into its
//! working directory.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "Str0ng!Passw0rd";

const FAST_CONFIG: &str = r#"
argon2_memory_kib = 8192
argon2_iterations = 1
argon2_parallelism = 1
"#;

/// Helper: get a Command pointing at the secrets-vault binary.
fn secrets_vault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("secrets-vault").expect("binary should exist");
    cmd.env_remove("SECRETS_VAULT_PASSWORD")
        .env_remove("SECRETS_VAULT_NEW_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: a project directory with the fast config in place.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".secrets-vault.toml").write_str(FAST_CONFIG).unwrap();
    tmp
}

/// Helper: run a command in `dir` with the master password in the env.
fn run_with_password(dir: &TempDir, args: &[&str]) -> assert_cmd::assert::Assert {
    secrets_vault()
        .current_dir(dir.path())
        .env("SECRETS_VAULT_PASSWORD", PASSWORD)
        .args(args)
        .assert()
}

// ---------------------------------------------------------------------------
// Basic CLI surface
// ---------------------------------------------------------------------------

#[test]
fn help_flag_lists_commands() {
    secrets_vault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password-protected store"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("unlock"))
        .stdout(predicate::str::contains("lock"))
        .stdout(predicate::str::contains("reset"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("persistence"))
        .stdout(predicate::str::contains("change-password"));
}

#[test]
fn version_flag_shows_version() {
    secrets_vault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_args_shows_error() {
    secrets_vault().assert().failure();
}

#[test]
fn unknown_persistence_mode_is_rejected() {
    secrets_vault()
        .args(["persistence", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ---------------------------------------------------------------------------
// Vault lifecycle
// ---------------------------------------------------------------------------

#[test]
fn status_on_empty_directory() {
    let dir = project();
    secrets_vault()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not initialized"));
}

#[test]
fn unlock_without_vault_fails() {
    let dir = project();
    run_with_password(&dir, &["unlock"])
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn init_creates_vault_files() {
    let dir = project();
    run_with_password(&dir, &["init"])
        .success()
        .stdout(predicate::str::contains("Vault created"));

    dir.child(".secrets-vault/vault.json")
        .assert(predicate::path::exists());
    dir.child(".secrets-vault/master.verifier")
        .assert(predicate::path::exists());

    run_with_password(&dir, &["init"])
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_weak_password() {
    let dir = project();
    secrets_vault()
        .current_dir(dir.path())
        .env("SECRETS_VAULT_PASSWORD", "short1")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("too weak"));

    dir.child(".secrets-vault/vault.json")
        .assert(predicate::path::missing());
}

#[test]
fn set_and_show_secret() {
    let dir = project();
    run_with_password(&dir, &["init"]).success();

    run_with_password(&dir, &["set", "storage.bucket", "media-prod"])
        .success()
        .stdout(predicate::str::contains("added"));

    run_with_password(&dir, &["show", "--reveal"])
        .success()
        .stdout(predicate::str::contains("storage.bucket"))
        .stdout(predicate::str::contains("media-prod"));

    run_with_password(&dir, &["set", "storage.colour", "blue"])
        .failure()
        .stderr(predicate::str::contains("Unknown secret field"));
}

#[test]
fn wrong_password_is_rejected() {
    let dir = project();
    run_with_password(&dir, &["init"]).success();

    secrets_vault()
        .current_dir(dir.path())
        .env("SECRETS_VAULT_PASSWORD", "Wr0ng!Password")
        .arg("unlock")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid password"));
}

#[test]
fn persisted_session_carries_across_invocations() {
    let dir = project();
    run_with_password(&dir, &["init"]).success();

    secrets_vault()
        .current_dir(dir.path())
        .args(["persistence", "on"])
        .assert()
        .success();
    run_with_password(&dir, &["unlock"]).success();
    dir.child(".secrets-vault/session.json")
        .assert(predicate::path::exists());

    secrets_vault()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("unlocked"));

    secrets_vault()
        .current_dir(dir.path())
        .arg("lock")
        .assert()
        .success();
    dir.child(".secrets-vault/session.json")
        .assert(predicate::path::missing());

    secrets_vault()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault is locked"));
}

#[test]
fn forced_reset_deletes_vault() {
    let dir = project();
    run_with_password(&dir, &["init"]).success();

    secrets_vault()
        .current_dir(dir.path())
        .args(["reset", "--force"])
        .assert()
        .success();

    dir.child(".secrets-vault/vault.json")
        .assert(predicate::path::missing());
    secrets_vault()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not initialized"));
}

#[test]
fn vault_dir_flag_overrides_default() {
    let dir = project();
    run_with_password(&dir, &["init", "--vault-dir", "elsewhere"]).success();
    dir.child("elsewhere/vault.json")
        .assert(predicate::path::exists());
}
