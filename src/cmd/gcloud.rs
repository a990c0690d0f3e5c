use crate::cmd::command::{CapturedOutput, CommandError, CommandKiller, ExternalCommand, command_to_string};
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GcloudError {
    #[error("gcloud cannot be executed: {raw_error_message}")]
    ExecutionError { raw_error_message: String },

    #[error("gcloud command `{command}` failed: {raw_error_message}")]
    CommandFailed { command: String, raw_error_message: String },

    #[error("gcloud command `{command}` terminated due to timeout: {raw_error_message}")]
    Timeout { command: String, raw_error_message: String },

    #[error("gcloud command `{command}` aborted: {raw_error_message}")]
    Aborted { command: String, raw_error_message: String },
}

impl GcloudError {
    pub fn raw_error_message(&self) -> &str {
        match self {
            GcloudError::ExecutionError { raw_error_message } => raw_error_message,
            GcloudError::CommandFailed { raw_error_message, .. } => raw_error_message,
            GcloudError::Timeout { raw_error_message, .. } => raw_error_message,
            GcloudError::Aborted { raw_error_message, .. } => raw_error_message,
        }
    }
}

/// Thin wrapper over the `gcloud` binary, every call is scoped to a project and non interactive.
#[derive(Debug, Clone)]
pub struct Gcloud {
    binary: String,
    project_id: String,
    timeout: Duration,
}

impl Gcloud {
    pub fn new(project_id: &str) -> Self {
        Gcloud {
            binary: "gcloud".to_string(),
            project_id: project_id.to_string(),
            timeout: Duration::from_secs(15 * 60),
        }
    }

    pub fn new_with_binary(binary: &str, project_id: &str, timeout: Duration) -> Self {
        Gcloud {
            binary: binary.to_string(),
            project_id: project_id.to_string(),
            timeout,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn full_args<'a>(&'a self, args: &[&'a str], project_flag: &'a str) -> Vec<&'a str> {
        let mut full_args = args.to_vec();
        full_args.push(project_flag);
        full_args.push("--quiet");
        full_args
    }

    /// Runs `gcloud <args> --project=<project> --quiet` and returns collected stdout lines.
    pub fn exec(&self, args: &[&str]) -> Result<Vec<String>, GcloudError> {
        self.exec_with_masked_args(args, &[])
    }

    pub fn exec_with_masked_args(&self, args: &[&str], masked_args: &[&str]) -> Result<Vec<String>, GcloudError> {
        let project_flag = format!("--project={}", self.project_id);
        let full_args = self.full_args(args, project_flag.as_str());
        let printable = command_to_string(&self.binary, &full_args, &[]);

        // prevent any interactive prompt from blocking the run
        let envs = [("CLOUDSDK_CORE_DISABLE_PROMPTS", "1")];
        let mut cmd = ExternalCommand::new_with_masked_args(&self.binary, &full_args, &envs, masked_args);
        let mut stderr_lines: Vec<String> = vec![];
        let mut output = CapturedOutput::default();

        let ret = cmd.exec_with_abort(
            &mut |line| output.stdout.push(line),
            &mut |line| {
                info!("{}", line);
                stderr_lines.push(line)
            },
            &CommandKiller::from_timeout(self.timeout),
        );
        output.stderr = stderr_lines;

        match ret {
            Ok(_) => Ok(output.stdout),
            Err(CommandError::ExecutionError(e)) => Err(GcloudError::ExecutionError {
                raw_error_message: e.to_string(),
            }),
            Err(CommandError::ExitStatusError(status)) => Err(GcloudError::CommandFailed {
                command: printable,
                raw_error_message: format!("{status}: {}", output.stderr_as_string()),
            }),
            Err(CommandError::TimeoutError(msg)) => Err(GcloudError::Timeout {
                command: printable,
                raw_error_message: msg,
            }),
            Err(CommandError::Killed(msg)) => Err(GcloudError::Aborted {
                command: printable,
                raw_error_message: msg,
            }),
        }
    }
}
