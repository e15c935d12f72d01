use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const SCRUBBED: [&str; 17] = [
    "NEWSAPI_KEY",
    "REDDIT_CLIENT_ID",
    "REDDIT_CLIENT_SECRET",
    "UNSPLASH_ACCESS_KEY",
    "TWITTER_ACCESS_TOKEN",
    "INSTAGRAM_ACCESS_TOKEN",
    "INSTAGRAM_ACCOUNT_ID",
    "FACEBOOK_PAGE_ACCESS_TOKEN",
    "FACEBOOK_PAGE_ID",
    "BLUESKY_HANDLE",
    "BLUESKY_PASSWORD",
    "POST_MODE",
    "BLOCKLIST_DOMAINS",
    "BLOCKLIST_KEYWORDS",
    "POST_TIME",
    "DRY_RUN",
    "RUN_NOW",
];

/// The binary with every credential and override removed and a scratch working directory.
fn curator(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("longevity-curator").expect("Binary exists");
    cmd.current_dir(dir)
        .env("IMAGE_PATH", dir.join("image.jpg"))
        .env("RUST_LOG", "info");
    for key in SCRUBBED {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = tempdir().unwrap();
    curator(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("schedule")));
}

#[test]
fn dry_run_without_credentials_finds_no_content() {
    let dir = tempdir().unwrap();
    curator(dir.path())
        .args(["run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No suitable content found today"));
    assert!(!dir.path().join("image.jpg").exists());
}

#[test]
fn schedule_with_run_now_runs_once_and_exits() {
    let dir = tempdir().unwrap();
    curator(dir.path())
        .args(["schedule", "--at", "06:15"])
        .env("RUN_NOW", "1")
        .env("DRY_RUN", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains("RUN_NOW set"));
}

#[test]
fn invalid_mode_fails_with_diagnostic() {
    let dir = tempdir().unwrap();
    curator(dir.path())
        .args(["run"])
        .env("POST_MODE", "tiktok")
        .assert()
        .failure()
        .stderr(predicate::str::contains("POST_MODE"));
}

#[test]
fn invalid_schedule_time_fails() {
    let dir = tempdir().unwrap();
    curator(dir.path())
        .args(["schedule", "--at", "25:99"])
        .assert()
        .failure();
}
