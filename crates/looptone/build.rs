use std::env;
use std::process::Command;

use time::OffsetDateTime;

// Emits LOOPTONE_VERSION, e.g. "0.1.0 (a1b2c3d-dirty, 2026-10-16)", for `--version`.
fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let revision = git_revision().unwrap_or_else(|| "unknown".to_string());
    println!(
        "cargo:rustc-env=LOOPTONE_VERSION={version} ({revision}, {})",
        build_day()
    );
}

fn git_revision() -> Option<String> {
    let out = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=7"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}

/// Calendar day of the build; SOURCE_DATE_EPOCH pins it for reproducible builds.
fn build_day() -> String {
    let when = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc);
    when.date().to_string()
}
