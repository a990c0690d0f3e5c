//! Command line and environment configuration.

use crate::models::gcp::regions::GcpRegion;
use crate::provisioner::ProvisionerConfig;
use crate::resource_log::DEFAULT_RESOURCE_LOG_FILE;
use crate::services::gcp::object_storage_regions::GcpStorageRegion;
use crate::test_runner::TestRunnerConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

pub const DOCKERFILE_NAME: &str = "Dockerfile";
const READINESS_ATTEMPTS: usize = 8;

/// Provisions a bucket and a Cloud Run service on GCP, tests it, and tears everything down.
#[derive(Parser, Debug)]
#[command(name = "gcp-automation", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Region of the Artifact Registry repository and the Cloud Run service.
    #[arg(long, global = true, env = "GCP_AUTOMATION_REGION", default_value = "us-central1")]
    pub region: GcpRegion,

    /// Bucket location, a multi-region (US, EU, ASIA) or a region.
    #[arg(long, global = true, env = "GCP_AUTOMATION_BUCKET_LOCATION", default_value = "US")]
    pub bucket_location: GcpStorageRegion,

    /// Artifact Registry docker repository.
    #[arg(long, global = true, env = "GCP_AUTOMATION_REPOSITORY", default_value = "automation")]
    pub repository: String,

    #[arg(long, global = true, env = "GCP_AUTOMATION_IMAGE_NAME", default_value = "automation-demo")]
    pub image_name: String,

    /// Docker build context, must contain a Dockerfile.
    #[arg(long, global = true, env = "GCP_AUTOMATION_CONTEXT_DIR", default_value = "container")]
    pub context_dir: PathBuf,

    #[arg(long, global = true, env = "GCP_AUTOMATION_CONTAINER_PORT", default_value_t = 8080)]
    pub container_port: u16,

    /// Where the report and screenshots are written.
    #[arg(long, global = true, env = "GCP_AUTOMATION_OUTPUT_DIR", default_value = "automation-output")]
    pub output_dir: PathBuf,

    #[arg(long, global = true, env = "GCP_AUTOMATION_RESOURCE_LOG", default_value = DEFAULT_RESOURCE_LOG_FILE)]
    pub resource_log: PathBuf,

    /// Headless browser binary, looked up in PATH when omitted.
    #[arg(long, global = true, env = "GCP_AUTOMATION_BROWSER")]
    pub browser: Option<String>,

    #[arg(long, global = true, env = "GCP_AUTOMATION_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Log filter (trace, debug, info, warn, error or a full filter directive).
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, global = true, env = "GCP_AUTOMATION_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate the credentials against the project.
    Init(CredentialsArgs),
    /// Provision the bucket, deploy the container and run the test suite.
    Setup(SetupArgs),
    /// Delete every resource created by `setup`.
    Reset(CredentialsArgs),
}

impl Command {
    pub fn credentials(&self) -> &CredentialsArgs {
        match self {
            Command::Init(credentials) | Command::Reset(credentials) => credentials,
            Command::Setup(setup) => &setup.credentials,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Init(_) => "init",
            Command::Setup(_) => "setup",
            Command::Reset(_) => "reset",
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CredentialsArgs {
    /// Service account JSON key file.
    #[arg(long)]
    pub creds: PathBuf,

    /// GCP project id.
    #[arg(long)]
    pub project: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SetupArgs {
    #[command(flatten)]
    pub credentials: CredentialsArgs,

    /// Leave the always failing case out of the suite.
    #[arg(long)]
    pub skip_intentional_failure: bool,

    /// Exit with code 3 when a test case failed.
    #[arg(long)]
    pub fail_on_test_failure: bool,
}

impl GlobalArgs {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn provisioner_config(&self) -> ProvisionerConfig {
        ProvisionerConfig {
            resource_log_path: self.resource_log.clone(),
            image_name: self.image_name.to_string(),
            context_dir: self.context_dir.clone(),
            dockerfile: PathBuf::from(DOCKERFILE_NAME),
            container_port: self.container_port,
            output_dir: self.output_dir.clone(),
            request_timeout: self.request_timeout(),
            readiness_attempts: READINESS_ATTEMPTS,
        }
    }

    pub fn test_runner_config(&self, setup: &SetupArgs) -> TestRunnerConfig {
        TestRunnerConfig {
            output_dir: self.output_dir.clone(),
            request_timeout: self.request_timeout(),
            include_intentional_failure: !setup.skip_intentional_failure,
        }
    }

    /// The build context must hold a Dockerfile.
    pub fn validate_context_dir(&self) -> Result<(), String> {
        let dockerfile = self.context_dir.join(DOCKERFILE_NAME);
        match dockerfile.is_file() {
            true => Ok(()),
            false => Err(format!(
                "No {} found in container directory `{}`.",
                DOCKERFILE_NAME,
                self.context_dir.display()
            )),
        }
    }
}
