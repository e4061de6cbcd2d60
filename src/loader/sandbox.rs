//! Sandboxed manifest evaluation.
//!
//! For manifests that are genuinely executable, the body is run as a program
//! under a configured interpreter, in a throwaway working directory, with the
//! ambient inputs injected through the environment:
//!
//! - `CAPSTAN_BASE_URL` — base URL for relative dependency references
//! - `CAPSTAN_PACKAGE_VERSION` — explicit package version, when provided
//! - `CAPSTAN_TOOLS_VERSION` — the declared schema version
//!
//! The program must write the JSON package snapshot to stdout and exit zero.
//! The directive line starts with `#`, which reads as a comment in the usual
//! interpreters, so the source is executed unmodified.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::loader::errors::LoadError;
use crate::loader::evaluate::{EvaluationContext, ManifestEvaluator, RawEvaluationOutput};

/// File name the manifest source is materialized under inside the sandbox.
const MANIFEST_FILE: &str = "manifest";

/// Interval between liveness checks while enforcing a timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Evaluator that runs the manifest as a subprocess.
#[derive(Debug, Clone)]
pub struct SandboxedEvaluator {
    interpreter: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl SandboxedEvaluator {
    /// Create an evaluator using the given interpreter binary.
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        SandboxedEvaluator {
            interpreter: interpreter.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Add extra arguments passed to the interpreter before the manifest path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Bound evaluation wall-clock time. Past the limit the manifest process
    /// is killed and the load fails; it is never restarted.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn evaluation_error(&self, detail: impl Into<String>) -> LoadError {
        LoadError::Evaluation {
            detail: detail.into(),
        }
    }
}

impl ManifestEvaluator for SandboxedEvaluator {
    fn evaluate(
        &self,
        source: &[u8],
        ctx: &EvaluationContext<'_>,
    ) -> Result<RawEvaluationOutput, LoadError> {
        let dir = tempfile::TempDir::new()
            .map_err(|e| self.evaluation_error(format!("failed to create sandbox dir: {}", e)))?;

        let manifest_path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&manifest_path, source)
            .map_err(|e| self.evaluation_error(format!("failed to stage manifest: {}", e)))?;

        let mut cmd = Command::new(&self.interpreter);
        cmd.args(&self.args)
            .arg(&manifest_path)
            .current_dir(dir.path())
            .env("CAPSTAN_BASE_URL", ctx.base_url)
            .env("CAPSTAN_TOOLS_VERSION", ctx.tools_version.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match ctx.version {
            Some(version) => cmd.env("CAPSTAN_PACKAGE_VERSION", version.to_string()),
            None => cmd.env_remove("CAPSTAN_PACKAGE_VERSION"),
        };

        tracing::debug!(
            interpreter = %self.interpreter.display(),
            "evaluating manifest in sandbox"
        );

        let mut child = cmd.spawn().map_err(|e| {
            self.evaluation_error(format!(
                "failed to spawn interpreter `{}`: {}",
                self.interpreter.display(),
                e
            ))
        })?;

        if let Some(timeout) = self.timeout {
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(_)) => break,
                    Ok(None) if start.elapsed() >= timeout => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(self.evaluation_error(format!(
                            "manifest evaluation timed out after {:.1}s",
                            timeout.as_secs_f64()
                        )));
                    }
                    Ok(None) => std::thread::sleep(POLL_INTERVAL),
                    Err(e) => {
                        return Err(
                            self.evaluation_error(format!("failed to wait for manifest: {}", e))
                        )
                    }
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| self.evaluation_error(format!("failed to collect output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.evaluation_error(format!(
                "manifest exited with {}{}{}",
                output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| format!("code {}", c)),
                if stderr.trim().is_empty() { "" } else { ": " },
                stderr.trim()
            )));
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(self.evaluation_error("manifest produced no output"));
        }

        Ok(RawEvaluationOutput::new(output.stdout))
    }
}
