//! External recursive unpacker.
//!
//! The tool is resolved on `PATH`, started with a structured argument list
//! in its own process group, and bounded by a timeout and a cancel token.
//! Only its exit status and the files it leaves behind are consumed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::engine::config::DelegateConfig;
use crate::engine::extract::INCOMPLETE_SUFFIX;
use crate::error::FwError;
use crate::timeout::{with_timeout_cancellable, CancelToken, TimeoutConfig};

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// How a delegate run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateOutcome {
    /// Exit status 0; every regular file under the output directory.
    Completed { files: Vec<PathBuf> },
    /// The program could not be found or started.
    Unavailable { reason: String },
    /// Non-zero exit. `None` when killed by a signal.
    Failed { code: Option<i32> },
    TimedOut { seconds: u64 },
    /// Cancelled by the caller; files already produced are listed.
    Cancelled { files: Vec<PathBuf> },
}

/// A configured unpacker.
#[derive(Debug, Clone)]
pub struct Delegate<'a> {
    config: &'a DelegateConfig,
}

impl<'a> Delegate<'a> {
    pub fn new(config: &'a DelegateConfig) -> Self {
        Self { config }
    }

    pub fn program(&self) -> &str {
        &self.config.program
    }

    /// Absolute path of the tool, if installed.
    pub fn resolve(&self) -> Option<PathBuf> {
        which::which(&self.config.program).ok()
    }

    /// Substitutes `{input}` and `{output}` inside each template argument.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.config
            .args
            .iter()
            .map(|arg| match arg.as_str() {
                INPUT_PLACEHOLDER => input.as_os_str().to_os_string(),
                OUTPUT_PLACEHOLDER => output.as_os_str().to_os_string(),
                other => OsString::from(
                    other
                        .replace(INPUT_PLACEHOLDER, &input.to_string_lossy())
                        .replace(OUTPUT_PLACEHOLDER, &output.to_string_lossy()),
                ),
            })
            .collect()
    }

    /// Runs the tool against `input`, writing into `output_dir`. Blocks the
    /// calling thread on a private current-thread runtime.
    pub fn run(&self, input: &Path, output_dir: &Path, cancel: &CancelToken) -> DelegateOutcome {
        let Some(program) = self.resolve() else {
            return DelegateOutcome::Unavailable {
                reason: format!("{} not found on PATH", self.config.program),
            };
        };
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            return DelegateOutcome::Unavailable {
                reason: format!("cannot create {}: {e}", output_dir.display()),
            };
        }
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                return DelegateOutcome::Unavailable {
                    reason: format!("runtime unavailable: {e}"),
                }
            }
        };
        let args = self.build_args(input, output_dir);
        runtime.block_on(self.run_async(&program, &args, output_dir, cancel))
    }

    async fn run_async(
        &self,
        program: &Path,
        args: &[OsString],
        output_dir: &Path,
        cancel: &CancelToken,
    ) -> DelegateOutcome {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return DelegateOutcome::Unavailable {
                    reason: format!("failed to start {}: {e}", program.display()),
                }
            }
        };
        debug!(program = %program.display(), pid = ?child.id(), "Delegate started");

        let timeout = TimeoutConfig::new(self.config.timeout_secs, "delegate-unpacker");
        let waited = with_timeout_cancellable(timeout, cancel, async {
            child.wait().await.map_err(FwError::from)
        })
        .await;

        match waited {
            Ok(status) if status.success() => {
                let files = collect_files(output_dir);
                info!(files = files.len(), "Delegate completed");
                DelegateOutcome::Completed { files }
            }
            Ok(status) => {
                warn!(code = ?status.code(), "Delegate exited with failure");
                DelegateOutcome::Failed {
                    code: status.code(),
                }
            }
            Err(FwError::Timeout { seconds }) => {
                kill_group(&mut child).await;
                DelegateOutcome::TimedOut { seconds }
            }
            Err(FwError::Cancelled) => {
                kill_group(&mut child).await;
                DelegateOutcome::Cancelled {
                    files: collect_files(output_dir),
                }
            }
            Err(e) => {
                warn!(error = %e, "Delegate wait failed");
                kill_group(&mut child).await;
                DelegateOutcome::Failed { code: None }
            }
        }
    }
}

/// Kills the child's whole process group, then the child itself.
async fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // Safety: plain syscall on a pgid we created; failure means it already exited.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Delegate already exited");
    }
}

/// Regular files under `dir`, sorted by path, skipping incomplete markers.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            !e.file_name()
                .to_string_lossy()
                .ends_with(INCOMPLETE_SUFFIX)
        })
        .map(|e| e.into_path())
        .collect()
}
