//! External command worker
//!
//! Runs one process per vote. The task context is written to the child's
//! stdin as JSON, per-worker parameters are passed as `TALLY_*`
//! environment variables, and the answer is read from stdout.

use crate::config::FileWorkerConfig;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use tally_application::{TaskContext, VoteWorker, WorkerAssignment, WorkerError};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// Errors raised while running a worker process
#[derive(Error, Debug)]
pub enum CommandWorkerError {
    #[error("Worker command is empty")]
    EmptyCommand,

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode task context: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Worker exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

impl From<CommandWorkerError> for WorkerError {
    fn from(e: CommandWorkerError) -> Self {
        match e {
            CommandWorkerError::NonZeroExit { code, stderr } => {
                WorkerError::NonZeroExit { code, stderr }
            }
            CommandWorkerError::Io(e) => WorkerError::Io(e.to_string()),
            e @ (CommandWorkerError::EmptyCommand | CommandWorkerError::Spawn { .. }) => {
                WorkerError::Spawn(e.to_string())
            }
            e @ CommandWorkerError::Encode(_) => WorkerError::Failed(e.to_string()),
        }
    }
}

/// [`VoteWorker`] backed by an external program
#[derive(Debug, Clone)]
pub struct CommandWorker {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl CommandWorker {
    /// `command[0]` is the program, the rest are its arguments
    pub fn new(command: Vec<String>) -> Result<Self, CommandWorkerError> {
        let mut parts = command.into_iter();
        let program = parts.next().ok_or(CommandWorkerError::EmptyCommand)?;
        if program.trim().is_empty() {
            return Err(CommandWorkerError::EmptyCommand);
        }
        Ok(Self {
            program,
            args: parts.collect(),
            working_dir: None,
            env: BTreeMap::new(),
        })
    }

    pub fn from_config(config: &FileWorkerConfig) -> Result<Self, CommandWorkerError> {
        let mut worker = Self::new(config.command.clone())?;
        worker.working_dir = config.working_dir.clone();
        worker.env = config.env.clone();
        Ok(worker)
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, assignment: &WorkerAssignment) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .env("TALLY_OPERATION", &assignment.operation)
            .env("TALLY_WORKER_INDEX", assignment.worker_index.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(temperature) = assignment.sampling.temperature {
            cmd.env("TALLY_TEMPERATURE", temperature.to_string());
        }
        if let Some(seed) = assignment.sampling.seed {
            cmd.env("TALLY_SEED", seed.to_string());
        }
        if let Some(model) = &assignment.model {
            cmd.env("TALLY_MODEL", model);
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where kill_on_drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }

    /// Run the process once and return the first non-empty stdout line
    pub async fn run(
        &self,
        context: &TaskContext,
        assignment: &WorkerAssignment,
    ) -> Result<String, CommandWorkerError> {
        let payload = serde_json::to_vec(context.value())?;

        debug!(
            "Spawning worker {} for '{}': {}",
            assignment.worker_index, assignment.operation, self.program
        );
        let mut child = self
            .command(assignment)
            .spawn()
            .map_err(|source| CommandWorkerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let write_context = async move {
            if let Some(mut stdin) = stdin {
                // Workers that ignore their input may exit before reading it
                match stdin.write_all(&payload).await {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            Ok(())
        };

        let (written, output) = tokio::join!(write_context, child.wait_with_output());
        let output = output?;
        written?;

        if !output.status.success() {
            return Err(CommandWorkerError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("Worker {} output: {:?}", assignment.worker_index, stdout);
        let answer = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        Ok(answer.to_string())
    }
}

#[async_trait]
impl VoteWorker for CommandWorker {
    async fn cast(
        &self,
        context: &TaskContext,
        assignment: &WorkerAssignment,
    ) -> Result<String, WorkerError> {
        Ok(self.run(context, assignment).await?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use tally_domain::SamplingParams;

    fn sh(script: &str) -> CommandWorker {
        CommandWorker::new(vec!["sh".into(), "-c".into(), script.into()]).unwrap()
    }

    fn assignment(worker_index: usize) -> WorkerAssignment {
        WorkerAssignment {
            operation: "deploy_gate".to_string(),
            worker_index,
            sampling: SamplingParams::with_temperature(0.5).seeded(7),
            model: Some("gpt-4.1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_answer_from_stdout() {
        let worker = sh("cat > /dev/null; echo; echo '  approve  '; echo because");
        let answer = worker
            .cast(&TaskContext::new(json!({"diff": "x"})), &assignment(0))
            .await
            .unwrap();
        assert_eq!(answer, "approve");
    }

    #[tokio::test]
    async fn test_context_written_to_stdin() {
        let context = json!({"question": "ship it?", "files": ["a.rs"]});
        let worker = sh("cat");
        let output = worker
            .run(&TaskContext::new(context.clone()), &assignment(0))
            .await
            .unwrap();
        let echoed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(echoed, context);
    }

    #[tokio::test]
    async fn test_assignment_passed_as_env() {
        let worker = sh(
            "echo \"$TALLY_OPERATION $TALLY_WORKER_INDEX $TALLY_TEMPERATURE $TALLY_SEED $TALLY_MODEL $EXTRA\"",
        )
        .with_env("EXTRA", "on");
        let output = worker
            .run(&TaskContext::default(), &assignment(3))
            .await
            .unwrap();
        assert_eq!(output, "deploy_gate 3 0.5 7 gpt-4.1 on");
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let worker = sh("echo boom >&2; exit 3");
        let err = worker
            .run(&TaskContext::default(), &assignment(0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandWorkerError::NonZeroExit { code: Some(3), ref stderr } if stderr == "boom"
        ));
        assert!(matches!(
            WorkerError::from(err),
            WorkerError::NonZeroExit { code: Some(3), .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let worker = CommandWorker::new(vec!["/nonexistent/tally-worker".into()]).unwrap();
        let err = worker
            .cast(&TaskContext::default(), &assignment(0))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Spawn(_)));
    }

    #[test]
    fn test_empty_command() {
        assert!(matches!(
            CommandWorker::new(Vec::new()),
            Err(CommandWorkerError::EmptyCommand)
        ));
        assert!(matches!(
            CommandWorker::from_config(&FileWorkerConfig::default()),
            Err(CommandWorkerError::EmptyCommand)
        ));
    }

    #[test]
    fn test_from_config() {
        let config = FileWorkerConfig {
            command: vec!["./vote.sh".into(), "--strict".into()],
            working_dir: Some(PathBuf::from("/tmp")),
            env: BTreeMap::from([("API_KEY".to_string(), "secret".to_string())]),
        };
        let worker = CommandWorker::from_config(&config).unwrap();
        assert_eq!(worker.program(), "./vote.sh");
        assert_eq!(worker.args, vec!["--strict"]);
        assert_eq!(worker.env["API_KEY"], "secret");
    }
}
