//! Update commands

use anyhow::{bail, Context, Result};
use core_update::{
    BuildInfo, CheckerConfig, ChecksumPolicy, Platform, ProgressObserver, ReleaseChecker,
    UpdateInfo, UpdateProgress, UpdateStage, Updater, UpdaterConfig,
};
use dialoguer::Confirm;
use indicatif::ProgressBar;

use crate::cli::{UpdateApplyArgs, UpdateCheckArgs, UpdateCommands};
use crate::output;

/// Lines of release notes shown before confirming
const NOTES_PREVIEW_LINES: usize = 15;

pub async fn run(command: UpdateCommands, build: BuildInfo) -> Result<()> {
    let checker = ReleaseChecker::new(CheckerConfig::from_env(build))?;

    match command {
        UpdateCommands::Check(args) => check(&checker, args).await,
        UpdateCommands::Apply(args) => apply(&checker, args).await,
    }
}

/// Check for updates only
async fn check(checker: &ReleaseChecker, args: UpdateCheckArgs) -> Result<()> {
    let info = fetch(checker, !args.json)
        .await
        .context("update check failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    output::kv("Current version", &info.current_version);
    output::kv("Latest version", &info.latest_version);
    println!();

    if info.update_available {
        output::success("Update available!");
        if !info.has_artifact() {
            output::warning(&format!(
                "No release artifact published for {}",
                Platform::current()
            ));
        }
        println!("Run 'core update apply' to update.");
    } else {
        output::info("You are already on the latest version.");
    }

    Ok(())
}

/// Check, confirm, then download and install
async fn apply(checker: &ReleaseChecker, args: UpdateApplyArgs) -> Result<()> {
    let info = fetch(checker, true)
        .await
        .context("failed to check for updates")?;

    if !info.update_available {
        println!("You are already on the latest version.");
        return Ok(());
    }

    if !info.has_artifact() {
        bail!(
            "no release artifact published for {} in v{}",
            Platform::current(),
            info.latest_version
        );
    }

    let binary_path =
        std::env::current_exe().context("failed to determine current binary path")?;

    if !args.yes {
        println!(
            "This will update CORE CLI from {} to {}.",
            info.current_version, info.latest_version
        );
        println!("The binary will be replaced at: {}", binary_path.display());
        show_release_notes(&info);
        println!();

        let proceed = Confirm::new()
            .with_prompt("Continue?")
            .default(false)
            .interact()?;

        if !proceed {
            println!("Update cancelled.");
            return Ok(());
        }
    }

    println!("\nStarting update...");

    let config = UpdaterConfig::from_info(&info, &binary_path)
        .with_checksum_policy(ChecksumPolicy::from_env());
    let mut updater = Updater::new(config)?.with_observer(TerminalProgress::new());

    let cancel = updater.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    updater.apply().await.context("update failed")?;

    println!("\nCORE CLI updated to v{}", info.latest_version);
    Ok(())
}

async fn fetch(checker: &ReleaseChecker, show_spinner: bool) -> core_update::Result<UpdateInfo> {
    let spinner = show_spinner.then(|| output::spinner("Checking for updates..."));
    let result = checker.check().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

fn show_release_notes(info: &UpdateInfo) {
    if info.release_notes.trim().is_empty() {
        return;
    }

    output::header("Release notes");
    for line in info.release_notes.lines().take(NOTES_PREVIEW_LINES) {
        println!("{}", line);
    }
    if info.release_notes.lines().count() > NOTES_PREVIEW_LINES {
        println!("...");
    }
}

/// Renders updater progress on the terminal
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        Self {
            bar: output::download_bar("Downloading update..."),
        }
    }
}

impl ProgressObserver for TerminalProgress {
    fn on_progress(&self, progress: &UpdateProgress) {
        match progress.stage {
            UpdateStage::Downloading => {
                if progress.bytes_total > 0 {
                    self.bar.set_length(progress.bytes_total);
                }
                self.bar.set_position(progress.bytes_done);
            }
            UpdateStage::Verifying => {
                self.bar.finish_and_clear();
                output::info("Verifying checksum...");
            }
            UpdateStage::Replacing => {
                self.bar.finish_and_clear();
                output::info("Replacing binary...");
            }
            UpdateStage::Complete => output::success("Update complete!"),
            // The returned error is reported once by the caller
            UpdateStage::Failed => self.bar.abandon(),
        }
    }
}
