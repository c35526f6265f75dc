//! Integration tests for the `hub` binary.
//!
//! These tests run the built binary with `--noop`, so rewritten commands are
//! printed instead of executed, in an empty directory with a throwaway home.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `hub` command isolated from the user's configuration.
fn hub(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hub").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GITHUB_USER", "tpw")
        .env("GITHUB_TOKEN", "abc123")
        .env_remove("GITHUB_HOST")
        .env_remove("HUB_CONFIG")
        .env_remove("HUB_LOG")
        .env_remove("HUB_DEBUG")
        .env_remove("BROWSER");
    cmd
}

#[test]
fn clone_shorthand_is_expanded() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .args(["--noop", "clone", "rtomayko/ronn"])
        .assert()
        .success()
        .stdout("git clone git://github.com/rtomayko/ronn.git\n");
}

#[test]
fn own_repository_uses_login_from_environment() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .args(["--noop", "clone", "-p", "resque"])
        .assert()
        .success()
        .stdout("git clone git@github.com:tpw/resque.git\n");
}

#[test]
fn push_to_several_remotes() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .args(["--noop", "push", "origin,staging", "master"])
        .assert()
        .success()
        .stdout("git push origin master\ngit push staging master\n");
}

#[test]
fn version_follows_git_version() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .args(["--noop", "--version"])
        .assert()
        .success()
        .stdout(format!(
            "git --version\nhub version {}\n",
            env!("CARGO_PKG_VERSION")
        ));
}

#[test]
fn no_subcommand_shows_help() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .arg("--noop")
        .assert()
        .success()
        .stdout("git help\n");
}

#[test]
fn browse_prints_url() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .args(["browse", "-u", "mojombo/bert", "commits"])
        .assert()
        .success()
        .stdout("https://github.com/mojombo/bert/commits/master\n");
}

#[test]
fn create_outside_repository_fails() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .args(["--noop", "create"])
        .assert()
        .code(1)
        .stdout("")
        .stderr("'create' must be run from inside a git repository\n");
}

#[test]
fn browse_without_project_prints_usage() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .args(["browse"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage: hub browse"));
}

#[test]
fn invalid_settings_file_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("hub.toml");
    std::fs::write(&config, "[api]\nscheme = 42\n").unwrap();
    hub(&home)
        .env("HUB_CONFIG", &config)
        .args(["--noop", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("hub: "));
}

#[test]
fn browser_from_environment_is_printed_under_noop() {
    let home = TempDir::new().unwrap();
    hub(&home)
        .env("BROWSER", "firefox --new-tab")
        .args(["--noop", "browse", "mojombo/bert"])
        .assert()
        .success()
        .stdout("firefox --new-tab https://github.com/mojombo/bert\n");
}
