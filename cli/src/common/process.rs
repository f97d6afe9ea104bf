//! # Makan Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Runs external commands with `tokio::process::Command` and maps non-zero
//! exits to `MakanError::ExternalCommand`. The only caller is the site
//! publisher, which commits and pushes the regenerated web page when
//! `site.push_to_git` is enabled.
//!
use crate::core::error::{MakanError, Result};
use anyhow::{anyhow, Context};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs `program args...` in `cwd`, capturing output. Non-zero exit is an error.
pub async fn run_command_capture(program: &str, args: &[&str], cwd: &Path) -> Result<String> {
    let command_line = format!("{} {}", program, args.join(" "));
    debug!("Running '{}' in {}", command_line, cwd.display());
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .with_context(|| format!("Failed to spawn '{}'", command_line))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(MakanError::ExternalCommand {
            cmd: command_line,
            status: output.status.to_string(),
            output: format!("{}{}", stdout, stderr),
        }));
    }
    Ok(stdout)
}

/// Stages, commits and pushes everything under `repo_dir`.
pub async fn push_to_git(repo_dir: &Path, message: &str) -> Result<()> {
    run_command_capture("git", &["add", "."], repo_dir).await?;
    run_command_capture("git", &["commit", "-m", message], repo_dir).await?;
    run_command_capture("git", &["push"], repo_dir).await?;
    info!("Pushed site changes from {}", repo_dir.display());
    Ok(())
}
