//! Stamps build metadata read by `core version` and the update checker

use std::process::Command;

fn main() {
    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    // Release builds set CORE_VERSION; without it the binary reports `dev`
    println!("cargo:rerun-if-env-changed=CORE_VERSION");
    if let Some(version) = std::env::var("CORE_VERSION")
        .ok()
        .map(|v| v.trim().trim_start_matches('v').to_string())
        .filter(|v| !v.is_empty())
    {
        println!("cargo:rustc-env=CORE_VERSION={}", version);
    }

    if let Some(sha) = git_short_sha() {
        println!("cargo:rustc-env=GIT_SHA={}", sha);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
}

fn git_short_sha() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|sha| !sha.is_empty())
}
