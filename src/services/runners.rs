//! Built-in phase runners.
//!
//! Native runners perform host-side checks directly; the script runners
//! delegate to `test-<phase>.sh` under the scenario's phases directory.
//! All runners stream what they verify to the per-phase log sink.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::domain::models::{
    FailureClass, PhaseContext, PhaseFailure, PhaseReport, ScenarioConfig,
};
use crate::domain::ports::PhaseRunner;

/// Environment passed to script-backed phases.
pub const SCENARIO_DIR_ENV: &str = "TEST_GENIE_SCENARIO_DIR";
pub const APP_ROOT_ENV: &str = "TEST_GENIE_APP_ROOT";

/// Filename convention for script-backed phases.
pub fn script_file_name(phase: &str) -> String {
    format!("test-{phase}.sh")
}

async fn log_line(log: &mut File, line: &str) {
    // Log writes are best effort; a full disk must not change the outcome.
    let _ = log.write_all(line.as_bytes()).await;
    let _ = log.write_all(b"\n").await;
}

fn spawn_failure(script: &Path, err: &io::Error) -> PhaseFailure {
    if err.kind() == io::ErrorKind::NotFound {
        PhaseFailure::classified(
            "bash is not installed",
            FailureClass::MissingDependency,
            "Install bash to run script-backed phases.",
        )
    } else {
        PhaseFailure::new(format!("failed to start {}: {err}", script.display()))
    }
}

/// Execute `bash <script>` with the test directory as working directory,
/// streaming stdout and stderr into the log sink. A non-zero exit status
/// is the failure.
pub(crate) async fn run_script(
    script: &Path,
    ctx: &PhaseContext,
    log: &mut File,
) -> Result<(), PhaseFailure> {
    let mut child = Command::new("bash")
        .arg(script)
        .current_dir(&ctx.test_dir)
        .env(SCENARIO_DIR_ENV, &ctx.scenario_dir)
        .env(APP_ROOT_ENV, &ctx.app_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_failure(script, &e))?;

    if let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) {
        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();
        let mut out_done = false;
        let mut err_done = false;
        while !(out_done && err_done) {
            tokio::select! {
                line = out_lines.next_line(), if !out_done => match line {
                    Ok(Some(line)) => log_line(log, &line).await,
                    _ => out_done = true,
                },
                line = err_lines.next_line(), if !err_done => match line {
                    Ok(Some(line)) => log_line(log, &line).await,
                    _ => err_done = true,
                },
            }
        }
    }

    let status = child.wait().await.map_err(|e| {
        PhaseFailure::new(format!("failed to wait for {}: {e}", script.display()))
    })?;
    let _ = log.flush().await;

    if status.success() {
        return Ok(());
    }
    let name = script
        .file_name()
        .map_or_else(|| script.display().to_string(), |n| n.to_string_lossy().into_owned());
    Err(match status.code() {
        Some(code) => PhaseFailure::new(format!("{name} exited with status {code}")),
        None => PhaseFailure::new(format!("{name} was terminated by a signal")),
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

/// Verifies the workspace convention: harness directories in place and
/// phase scripts executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureRunner;

#[async_trait]
impl PhaseRunner for StructureRunner {
    async fn run(&self, ctx: PhaseContext, mut log: File) -> PhaseReport {
        let mut observations = Vec::new();

        for (label, path) in [
            ("test directory", &ctx.test_dir),
            ("phase directory", &ctx.phases_dir),
        ] {
            if !path.is_dir() {
                let failure = PhaseFailure::classified(
                    format!("{label} missing at {}", path.display()),
                    FailureClass::Misconfiguration,
                    "Recreate the scenario test harness layout (test/ and test/phases/).",
                );
                return PhaseReport::failed(failure, observations);
            }
            log_line(&mut log, &format!("{label} present: {}", path.display())).await;
            observations.push(format!("{label} present"));
        }

        let mut script_count = 0usize;
        match std::fs::read_dir(&ctx.phases_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !(name.starts_with("test-") && name.ends_with(".sh")) {
                        continue;
                    }
                    if !is_executable(&path) {
                        let failure = PhaseFailure::classified(
                            format!("phase script {name} is not executable"),
                            FailureClass::Misconfiguration,
                            format!("Run chmod +x {}", path.display()),
                        );
                        return PhaseReport::failed(failure, observations);
                    }
                    script_count += 1;
                    log_line(&mut log, &format!("phase script ok: {name}")).await;
                }
            }
            Err(e) => {
                let failure = PhaseFailure::new(format!(
                    "failed to scan {}: {e}",
                    ctx.phases_dir.display()
                ));
                return PhaseReport::failed(failure, observations);
            }
        }
        observations.push(format!("{script_count} phase scripts verified"));
        PhaseReport::passed(observations)
    }
}

/// Probes for required host commands; a missing binary is a
/// `missing_dependency` failure with an install hint.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependenciesRunner;

async fn command_available(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .is_ok()
}

#[async_trait]
impl PhaseRunner for DependenciesRunner {
    async fn run(&self, ctx: PhaseContext, mut log: File) -> PhaseReport {
        let mut commands = vec!["bash".to_string()];
        // Scenario config was validated pre-flight; a load failure here
        // only costs the extra probes.
        if let Ok(config) = ScenarioConfig::load(&ctx.scenario_dir) {
            commands.extend(config.required_commands);
        }
        commands.dedup();

        let mut observations = Vec::new();
        for cmd in commands {
            if ctx.cancel.is_cancelled() {
                let failure = PhaseFailure::new("dependency probe canceled");
                return PhaseReport::failed(failure, observations);
            }
            if command_available(&cmd).await {
                log_line(&mut log, &format!("command available: {cmd}")).await;
                observations.push(format!("command '{cmd}' available"));
            } else {
                log_line(&mut log, &format!("command missing: {cmd}")).await;
                let failure = PhaseFailure::classified(
                    format!("required command '{cmd}' is not installed"),
                    FailureClass::MissingDependency,
                    format!("Install {cmd} and re-run the suite."),
                );
                return PhaseReport::failed(failure, observations);
            }
        }
        PhaseReport::passed(observations)
    }
}

/// Native runner for phases whose work lives in the conventional
/// `test-<phase>.sh` script. When the script is absent the phase passes
/// with nothing to run.
#[derive(Debug, Clone)]
pub struct ScriptDelegateRunner {
    phase: String,
}

impl ScriptDelegateRunner {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
        }
    }
}

#[async_trait]
impl PhaseRunner for ScriptDelegateRunner {
    async fn run(&self, ctx: PhaseContext, mut log: File) -> PhaseReport {
        let file_name = script_file_name(&self.phase);
        let script = ctx.phases_dir.join(&file_name);
        if !script.is_file() {
            let note = format!("no {file_name} script present; nothing to run");
            log_line(&mut log, &note).await;
            return PhaseReport::passed(vec![note]);
        }

        match run_script(&script, &ctx, &mut log).await {
            Ok(()) => PhaseReport::passed(vec![format!("{file_name} completed successfully")]),
            Err(failure) => PhaseReport::failed(failure, vec![format!("{file_name} executed")]),
        }
    }
}

/// Runner for filesystem-discovered script phases.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    script: PathBuf,
}

impl ScriptRunner {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

#[async_trait]
impl PhaseRunner for ScriptRunner {
    async fn run(&self, ctx: PhaseContext, mut log: File) -> PhaseReport {
        let name = self
            .script
            .file_name()
            .map_or_else(|| self.script.display().to_string(), |n| n.to_string_lossy().into_owned());
        match run_script(&self.script, &ctx, &mut log).await {
            Ok(()) => PhaseReport::passed(vec![format!("{name} completed successfully")]),
            Err(failure) => PhaseReport::failed(failure, vec![format!("{name} executed")]),
        }
    }
}
