extern crate derivative;

use crate::cmd::docker::DockerError;
use crate::cmd::gcloud::GcloudError;
use crate::deployment::DeploymentError;
use crate::events::{EventDetails, Stage};
use crate::models::gcp::CredentialsError;
use crate::object_storage::errors::ObjectStorageError;
use crate::resource_log::ResourceLogError;
use crate::test_runner::report::ReportError;
use derivative::Derivative;
use std::fmt::{Display, Formatter};
use std::io::Error;
use std::path::Path;
use thiserror::Error;

/// ErrorMessageVerbosity: represents command error message's verbosity from minimal to full verbosity.
pub enum ErrorMessageVerbosity {
    SafeOnly,
    FullDetailsWithoutEnvVars,
    FullDetails,
}

/// CommandError: command error, mostly returned by third party tools.
#[derive(Derivative, Clone, Error, PartialEq)]
#[derivative(Debug)]
pub struct CommandError {
    /// full_details: full error message, can contains unsafe text such as passwords and tokens.
    full_details: Option<String>,
    /// message_safe: error message omitting displaying any protected data such as passwords and tokens.
    message_safe: String,
    /// env_vars: environments variables including touchy data such as secret keys.
    #[derivative(Debug = "ignore")]
    env_vars: Option<Vec<(String, String)>>,
}

impl CommandError {
    /// Returns CommandError message_raw. May contains unsafe text such as passwords and tokens.
    pub fn message_raw(&self) -> Option<String> {
        self.full_details.clone()
    }

    /// Returns CommandError message_safe omitting all unsafe text such as passwords and tokens.
    pub fn message_safe(&self) -> String {
        self.message_safe.to_string()
    }

    /// Returns CommandError env_vars.
    pub fn env_vars(&self) -> Option<Vec<(String, String)>> {
        self.env_vars.clone()
    }

    /// Returns error message based on verbosity.
    pub fn message(&self, message_verbosity: ErrorMessageVerbosity) -> String {
        match message_verbosity {
            ErrorMessageVerbosity::SafeOnly => self.message_safe.to_string(),
            ErrorMessageVerbosity::FullDetailsWithoutEnvVars => match &self.full_details {
                None => self.message(ErrorMessageVerbosity::SafeOnly),
                Some(full_details) => format!("{} / Full details: {}", self.message_safe, full_details),
            },
            ErrorMessageVerbosity::FullDetails => match &self.full_details {
                None => self.message(ErrorMessageVerbosity::SafeOnly),
                Some(full_details) => match &self.env_vars {
                    None => format!("{} / Full details: {}", self.message_safe, full_details),
                    Some(env_vars) => {
                        format!(
                            "{} / Full details: {} / Env vars: {}",
                            self.message_safe,
                            full_details,
                            env_vars
                                .iter()
                                .map(|(k, v)| format!("{k}={v}"))
                                .collect::<Vec<String>>()
                                .join(" "),
                        )
                    }
                },
            },
        }
    }

    /// Creates a new CommandError from safe message. To be used when message is safe.
    pub fn new_from_safe_message(message: String) -> Self {
        CommandError::new(message, None, None)
    }

    /// Creates a new CommandError having both a safe, an unsafe message and env vars.
    pub fn new(message_safe: String, message_raw: Option<String>, env_vars: Option<Vec<(String, String)>>) -> Self {
        CommandError {
            full_details: message_raw,
            message_safe,
            env_vars,
        }
    }
}

impl Default for CommandError {
    fn default() -> Self {
        Self {
            full_details: None,
            message_safe: "Unknown command error".to_string(),
            env_vars: None,
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message(ErrorMessageVerbosity::SafeOnly).as_str()) // By default, expose safe message only
    }
}

impl From<Error> for CommandError {
    fn from(err: Error) -> Self {
        CommandError::new("IO error".to_string(), Some(err.to_string()), None)
    }
}

impl From<CredentialsError> for CommandError {
    fn from(credentials_error: CredentialsError) -> Self {
        // credentials errors never carry the private key, they are safe to display
        CommandError::new_from_safe_message(credentials_error.to_string())
    }
}

impl From<ObjectStorageError> for CommandError {
    fn from(object_storage_error: ObjectStorageError) -> Self {
        // Note: safe message to be manually computed here because we are not 100% sure error won't leak some data
        match object_storage_error {
            ObjectStorageError::CannotListBuckets { raw_error_message } => CommandError::new(
                "Object storage error, cannot list buckets".to_string(),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::InvalidBucketName {
                bucket_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, invalid bucket name: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::BucketAlreadyExists {
                bucket_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, bucket already exists: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::CannotCreateBucket {
                bucket_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, cannot create bucket: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::CannotGetBucket {
                bucket_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, cannot get bucket: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::CannotDeleteBucket {
                bucket_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, cannot delete bucket: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::CannotEmptyBucket {
                bucket_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, cannot empty bucket: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::CannotListObjects {
                bucket_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, cannot list objects from bucket: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
            ObjectStorageError::CannotUploadFile {
                bucket_name,
                file_name,
                raw_error_message,
            } => CommandError::new(
                format!("Object storage error, cannot upload file `{file_name}` into bucket: `{bucket_name}`"),
                Some(raw_error_message),
                None,
            ),
        }
    }
}

impl From<DockerError> for CommandError {
    fn from(docker_error: DockerError) -> Self {
        match docker_error {
            DockerError::InvalidConfig(message) => {
                CommandError::new("Docker invalid configuration".to_string(), Some(message), None)
            }
            DockerError::ExecutionError(e) => {
                CommandError::new("Docker cannot be executed".to_string(), Some(e.to_string()), None)
            }
            DockerError::ExitStatusError(status) => CommandError::new(
                "Docker terminated with a non success exit status code".to_string(),
                Some(status.to_string()),
                None,
            ),
            DockerError::Aborted(message) => CommandError::new("Docker command aborted".to_string(), Some(message), None),
            DockerError::Timeout(message) => {
                CommandError::new("Docker command terminated due to timeout".to_string(), Some(message), None)
            }
        }
    }
}

impl From<GcloudError> for CommandError {
    fn from(gcloud_error: GcloudError) -> Self {
        // gcloud stderr can echo tokens back, it only goes to the raw message
        let raw_error_message = gcloud_error.raw_error_message().to_string();
        let safe_message = match gcloud_error {
            GcloudError::ExecutionError { .. } => "gcloud cannot be executed".to_string(),
            GcloudError::CommandFailed { command, .. } => format!("gcloud command `{command}` failed"),
            GcloudError::Timeout { command, .. } => format!("gcloud command `{command}` timed out"),
            GcloudError::Aborted { command, .. } => format!("gcloud command `{command}` aborted"),
        };

        CommandError::new(safe_message, Some(raw_error_message), None)
    }
}

impl From<DeploymentError> for CommandError {
    fn from(deployment_error: DeploymentError) -> Self {
        // raw messages come from gcloud and docker outputs, they stay out of the safe message
        let safe_message = match &deployment_error {
            DeploymentError::CannotCreateRepository { repository_name, .. } => {
                format!("Deployment error, cannot create repository `{repository_name}`")
            }
            DeploymentError::CannotLoginToRegistry { registry, .. } => {
                format!("Deployment error, cannot login to registry `{registry}`")
            }
            DeploymentError::CannotBuildImage { image, .. } => format!("Deployment error, cannot build image `{image}`"),
            DeploymentError::CannotPushImage { image, .. } => format!("Deployment error, cannot push image `{image}`"),
            DeploymentError::CannotDeployService { service_name, .. } => {
                format!("Deployment error, cannot deploy service `{service_name}`")
            }
            DeploymentError::CannotGetServiceUrl { service_name, .. } => {
                format!("Deployment error, cannot get service `{service_name}` URL")
            }
            DeploymentError::CannotDeleteService { service_name, .. } => {
                format!("Deployment error, cannot delete service `{service_name}`")
            }
            DeploymentError::CannotDeleteImage { image, .. } => format!("Deployment error, cannot delete image `{image}`"),
            DeploymentError::CannotDeleteRepository { repository_name, .. } => {
                format!("Deployment error, cannot delete repository `{repository_name}`")
            }
        };

        CommandError::new(safe_message, Some(deployment_error.get_raw_error_message()), None)
    }
}

impl From<ResourceLogError> for CommandError {
    fn from(resource_log_error: ResourceLogError) -> Self {
        CommandError::new_from_safe_message(resource_log_error.to_string())
    }
}

impl From<ReportError> for CommandError {
    fn from(report_error: ReportError) -> Self {
        match report_error {
            ReportError::CannotRender { raw_error_message } => {
                CommandError::new("Cannot render report template".to_string(), Some(raw_error_message), None)
            }
            ReportError::CannotWrite { path, raw_error_message } => {
                CommandError::new(format!("Cannot write report `{path}`"), Some(raw_error_message), None)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Tag: unique identifier for an error.
pub enum Tag {
    /// Unknown: unknown error.
    Unknown,
    /// InvalidConfiguration: represents an error on command-line or environment configuration.
    InvalidConfiguration,
    /// CredentialsFileNotFound: represents an error, service account key file doesn't exist.
    CredentialsFileNotFound,
    /// CredentialsInvalid: represents an error, service account key file or project id is malformed.
    CredentialsInvalid,
    /// CredentialsRejected: represents an error, the provider refused the credentials.
    CredentialsRejected,
    /// AlreadyProvisioned: represents an error, resources from a previous setup are still tracked.
    AlreadyProvisioned,
    /// BucketAlreadyExists: represents an error, the generated bucket name is already taken.
    BucketAlreadyExists,
    /// CannotCreateBucket: represents an error while trying to create a bucket.
    CannotCreateBucket,
    /// CannotCreateRepository: represents an error while trying to create the image repository.
    CannotCreateRepository,
    /// CannotBuildImage: represents an error while trying to build the container image.
    CannotBuildImage,
    /// CannotPushImage: represents an error while trying to push the container image.
    CannotPushImage,
    /// CannotDeployService: represents an error while trying to deploy the container image.
    CannotDeployService,
    /// ServiceNotReachable: represents an error, deployed service never answered.
    ServiceNotReachable,
    /// CannotGenerateReport: represents an error while rendering or writing the test report.
    CannotGenerateReport,
    /// ReportNotFound: represents an error, no report to upload.
    ReportNotFound,
    /// CannotUploadArtifact: represents an error while uploading a report artifact.
    CannotUploadArtifact,
    /// CannotReadResourceLog: represents an error while reading the resource log.
    CannotReadResourceLog,
    /// CannotWriteResourceLog: represents an error while writing the resource log.
    CannotWriteResourceLog,
    /// ReclaimIncomplete: represents an error, some tracked resources could not be deleted.
    ReclaimIncomplete,
    /// ResourceLogProjectMismatch: represents an error, the resource log tracks resources of another project.
    ResourceLogProjectMismatch,
}

#[derive(Clone, Debug, PartialEq)]
/// EngineError: represents an error carrying context infos easing monitoring and debugging.
pub struct EngineError {
    /// tag: error unique identifier
    tag: Tag,
    /// event_details: holds context details in which error was triggered such as project ID, execution ID, etc.
    event_details: EventDetails,
    /// user_log_message: message targeted toward users.
    user_log_message: String,
    /// underlying_error: raw error message such as command input / output.
    underlying_error: Option<CommandError>,
    /// hint_message: an hint message aiming to give an hint to the user.
    hint_message: Option<String>,
}

impl EngineError {
    /// Returns error's unique identifier.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Returns error's event details.
    pub fn event_details(&self) -> &EventDetails {
        &self.event_details
    }

    /// Returns user log message.
    pub fn user_log_message(&self) -> &str {
        &self.user_log_message
    }

    /// Returns proper error message.
    pub fn message(&self, message_verbosity: ErrorMessageVerbosity) -> String {
        match &self.underlying_error {
            Some(msg) => format!("{}: {}", self.user_log_message, msg.message(message_verbosity)),
            None => self.user_log_message.to_string(),
        }
    }

    /// Returns underlying error.
    pub fn underlying_error(&self) -> Option<CommandError> {
        self.underlying_error.clone()
    }

    /// Returns error's hint message.
    pub fn hint_message(&self) -> &Option<String> {
        &self.hint_message
    }

    fn new(
        event_details: EventDetails,
        tag: Tag,
        user_log_message: String,
        underlying_error: Option<CommandError>,
        hint_message: Option<String>,
    ) -> Self {
        EngineError {
            event_details,
            tag,
            user_log_message,
            underlying_error,
            hint_message,
        }
    }

    /// Clone an existing engine error to specify a stage
    ///
    /// Arguments:
    ///
    /// * `stage`: stage that replaces the current stage of the engine error
    pub fn clone_engine_error_with_stage(&self, stage: Stage) -> Self {
        let mut engine_error = self.clone();
        engine_error.event_details = EventDetails::clone_changing_stage(&self.event_details, stage);
        engine_error
    }

    /// Creates new unknown error.
    ///
    /// Note: do not use unless really needed, every error should have a clear type.
    pub fn new_unknown(
        event_details: EventDetails,
        user_log_message: String,
        underlying_error: Option<CommandError>,
        hint_message: Option<String>,
    ) -> EngineError {
        EngineError::new(event_details, Tag::Unknown, user_log_message, underlying_error, hint_message)
    }

    /// Creates new error for an invalid configuration value.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `message`: What is wrong with the configuration.
    pub fn new_invalid_configuration(event_details: EventDetails, message: String) -> EngineError {
        EngineError::new(event_details, Tag::InvalidConfiguration, message, None, None)
    }

    /// Creates new error for a missing service account key file.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `credentials_path`: Path given on the command line.
    pub fn new_credentials_file_not_found(event_details: EventDetails, credentials_path: &Path) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CredentialsFileNotFound,
            format!(
                "Service account key file `{}` doesn't exist or is not a file.",
                credentials_path.display()
            ),
            None,
            Some("Download a JSON key for the service account and pass its path with `--creds`.".to_string()),
        )
    }

    /// Creates new error for a malformed service account key or project id.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `error`: Validation error.
    pub fn new_credentials_invalid(event_details: EventDetails, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CredentialsInvalid,
            "Service account credentials are not valid.".to_string(),
            Some(error),
            None,
        )
    }

    /// Creates new error for credentials refused by the provider.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `error`: Provider error.
    pub fn new_credentials_rejected(event_details: EventDetails, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CredentialsRejected,
            "Google Cloud rejected the service account credentials.".to_string(),
            Some(error),
            Some("Check that the service account exists, its key is not revoked and it has access to the project.".to_string()),
        )
    }

    /// Creates new error when resources from a previous setup are still tracked.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `resource_log_path`: Resource log holding the tracked resources.
    /// * `tracked_resources`: Tracked resources descriptions.
    pub fn new_already_provisioned(
        event_details: EventDetails,
        resource_log_path: &Path,
        tracked_resources: Vec<String>,
    ) -> EngineError {
        EngineError::new(
            event_details,
            Tag::AlreadyProvisioned,
            format!(
                "Resources from a previous setup are still tracked in `{}`: {}.",
                resource_log_path.display(),
                tracked_resources.join(", ")
            ),
            None,
            Some("Run `reset` first to delete them.".to_string()),
        )
    }

    /// Creates new error when the generated bucket name is already taken.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `bucket_name`: Bucket name.
    pub fn new_bucket_already_exists(event_details: EventDetails, bucket_name: &str) -> EngineError {
        EngineError::new(
            event_details,
            Tag::BucketAlreadyExists,
            format!("Bucket `{bucket_name}` already exists."),
            None,
            Some("Bucket names are global, run the setup again to get a new name.".to_string()),
        )
    }

    /// Creates new error while creating a bucket.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `bucket_name`: Bucket name.
    /// * `error`: Raw error message.
    pub fn new_cannot_create_bucket(event_details: EventDetails, bucket_name: &str, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotCreateBucket,
            format!("Cannot create bucket `{bucket_name}`."),
            Some(error),
            None,
        )
    }

    /// Creates new error while creating the image repository.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `repository_name`: Repository name.
    /// * `error`: Raw error message.
    pub fn new_cannot_create_repository(
        event_details: EventDetails,
        repository_name: &str,
        error: CommandError,
    ) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotCreateRepository,
            format!("Cannot create image repository `{repository_name}`."),
            Some(error),
            Some("The service account needs the `Artifact Registry Administrator` role.".to_string()),
        )
    }

    /// Creates new error while building the container image.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `image_name`: Image name.
    /// * `error`: Raw error message.
    pub fn new_cannot_build_image(event_details: EventDetails, image_name: &str, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotBuildImage,
            format!("Cannot build image `{image_name}`."),
            Some(error),
            Some("Check that docker is running and the context directory contains a Dockerfile.".to_string()),
        )
    }

    /// Creates new error while pushing the container image.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `image_name`: Image name.
    /// * `error`: Raw error message.
    pub fn new_cannot_push_image(event_details: EventDetails, image_name: &str, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotPushImage,
            format!("Cannot push image `{image_name}`."),
            Some(error),
            None,
        )
    }

    /// Creates new error while deploying the service.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `service_name`: Service name.
    /// * `error`: Raw error message.
    pub fn new_cannot_deploy_service(event_details: EventDetails, service_name: &str, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotDeployService,
            format!("Cannot deploy service `{service_name}`."),
            Some(error),
            Some("The service account needs the `Cloud Run Admin` and `Service Account User` roles.".to_string()),
        )
    }

    /// Creates new error when the deployed service never answered.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `service_url`: Service public URL.
    /// * `error`: Raw error message.
    pub fn new_service_not_reachable(event_details: EventDetails, service_url: &str, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::ServiceNotReachable,
            format!("Service `{service_url}` is not reachable."),
            Some(error),
            Some("Happens when the container doesn't listen on the configured port.".to_string()),
        )
    }

    /// Creates new error while rendering or writing the report.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `error`: Raw error message.
    pub fn new_cannot_generate_report(event_details: EventDetails, error: CommandError) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotGenerateReport,
            "Cannot generate the test report.".to_string(),
            Some(error),
            None,
        )
    }

    /// Creates new error when there is no report to upload.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `report_path`: Expected report path.
    pub fn new_report_not_found(event_details: EventDetails, report_path: &Path) -> EngineError {
        EngineError::new(
            event_details,
            Tag::ReportNotFound,
            format!("Report `{}` doesn't exist.", report_path.display()),
            None,
            None,
        )
    }

    /// Creates new error while uploading an artifact.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `bucket_name`: Target bucket.
    /// * `object_key`: Target object key.
    /// * `error`: Raw error message.
    pub fn new_cannot_upload_artifact(
        event_details: EventDetails,
        bucket_name: &str,
        object_key: &str,
        error: CommandError,
    ) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotUploadArtifact,
            format!("Cannot upload `{object_key}` to bucket `{bucket_name}`."),
            Some(error),
            None,
        )
    }

    /// Creates new error while reading the resource log.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `resource_log_path`: Resource log path.
    /// * `error`: Raw error message.
    pub fn new_cannot_read_resource_log(
        event_details: EventDetails,
        resource_log_path: &Path,
        error: CommandError,
    ) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotReadResourceLog,
            format!("Cannot read resource log `{}`.", resource_log_path.display()),
            Some(error),
            Some("The file may have been edited by hand, fix or remove it.".to_string()),
        )
    }

    /// Creates new error while writing the resource log.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `resource_log_path`: Resource log path.
    /// * `error`: Raw error message.
    pub fn new_cannot_write_resource_log(
        event_details: EventDetails,
        resource_log_path: &Path,
        error: CommandError,
    ) -> EngineError {
        EngineError::new(
            event_details,
            Tag::CannotWriteResourceLog,
            format!("Cannot write resource log `{}`.", resource_log_path.display()),
            Some(error),
            None,
        )
    }

    /// Creates new error when some tracked resources couldn't be deleted.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `remaining_resources`: Resources still tracked after the reclaim.
    pub fn new_reclaim_incomplete(event_details: EventDetails, remaining_resources: Vec<String>) -> EngineError {
        EngineError::new(
            event_details,
            Tag::ReclaimIncomplete,
            format!("Some resources could not be deleted: {}.", remaining_resources.join(", ")),
            None,
            Some("They are still tracked in the resource log, run `reset` again.".to_string()),
        )
    }

    /// Creates new error when the resource log was written for another project.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `resource_log_path`: Resource log path.
    /// * `logged_project_id`: Project recorded in the resource log.
    pub fn new_resource_log_project_mismatch(
        event_details: EventDetails,
        resource_log_path: &Path,
        logged_project_id: &str,
    ) -> EngineError {
        let message = format!(
            "Resource log `{}` tracks resources of project `{}`, not `{}`.",
            resource_log_path.display(),
            logged_project_id,
            event_details.project_id()
        );
        EngineError::new(
            event_details,
            Tag::ResourceLogProjectMismatch,
            message,
            None,
            Some(format!("Run `reset` with `--project {logged_project_id}`.")),
        )
    }
}
