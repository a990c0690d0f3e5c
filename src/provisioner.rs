use crate::deployment::{DeploymentError, DeploymentTarget, ImageBuild, RepositoryOutcome, ServiceDeployment};
use crate::errors::{CommandError, EngineError};
use crate::events::{EngineEvent, EventDetails, EventMessage, GeneralStep, ProvisioningStep, Stage, TestingStep};
use crate::initializer::ValidatedCredentials;
use crate::logger::Logger;
use crate::models::to_short_id;
use crate::object_storage::errors::ObjectStorageError;
use crate::object_storage::{BucketObject, ObjectStorage};
use crate::resource_log::{ResourceLog, TrackedService};
use crate::test_runner::TestRunner;
use crate::test_runner::report::{REPORT_FILE_NAME, TestReport, write_report};
use crate::uploader::Uploader;
use chrono::Utc;
use reqwest::blocking::Client;
use retry::OperationResult;
use retry::delay::Fibonacci;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

pub const BUCKET_NAME_PREFIX: &str = "automation-bucket-";
pub const SERVICE_NAME_PREFIX: &str = "automation-service-";
const CREATED_BY_LABEL: (&str, &str) = ("created_by", "gcp-automation");

#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub resource_log_path: PathBuf,
    pub image_name: String,
    pub context_dir: PathBuf,
    pub dockerfile: PathBuf,
    pub container_port: u16,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
    /// Readiness requests before giving up, spaced with a Fibonacci back-off starting at one second.
    pub readiness_attempts: usize,
}

/// Everything created by a successful provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub bucket_name: String,
    pub image: String,
    pub service: TrackedService,
    pub service_url: Url,
}

#[derive(Debug, Clone)]
pub struct SetupOutcome {
    pub provisioned: Provisioned,
    pub report: TestReport,
    pub uploaded: Vec<BucketObject>,
}

pub fn generate_bucket_name() -> String {
    format!("{BUCKET_NAME_PREFIX}{}", to_short_id(&Uuid::new_v4()))
}

pub fn labels() -> HashMap<String, String> {
    HashMap::from([(CREATED_BY_LABEL.0.to_string(), CREATED_BY_LABEL.1.to_string())])
}

/// Common labels plus `creation_date`, in unix seconds.
pub fn bucket_labels() -> HashMap<String, String> {
    let mut labels = labels();
    labels.insert("creation_date".to_string(), Utc::now().timestamp().to_string());
    labels
}

pub struct Provisioner<'a> {
    credentials: &'a ValidatedCredentials,
    object_storage: &'a dyn ObjectStorage,
    deployment_target: &'a dyn DeploymentTarget,
    config: ProvisionerConfig,
    logger: Box<dyn Logger>,
    event_details: EventDetails,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        credentials: &'a ValidatedCredentials,
        object_storage: &'a dyn ObjectStorage,
        deployment_target: &'a dyn DeploymentTarget,
        config: ProvisionerConfig,
        logger: Box<dyn Logger>,
        event_details: &EventDetails,
    ) -> Self {
        Provisioner {
            credentials,
            object_storage,
            deployment_target,
            config,
            logger,
            event_details: event_details.clone(),
        }
    }

    fn details(&self, step: ProvisioningStep) -> EventDetails {
        EventDetails::clone_changing_stage(&self.event_details, Stage::Provisioning(step))
    }

    fn info(&self, step: ProvisioningStep, message: String) {
        self.logger
            .log(EngineEvent::Info(self.details(step), EventMessage::new_from_safe(message)));
    }

    fn write_error(&self, resource_log: &ResourceLog, error: impl Into<CommandError>) -> EngineError {
        EngineError::new_cannot_write_resource_log(
            EventDetails::clone_changing_stage(&self.event_details, Stage::General(GeneralStep::SaveResourceLog)),
            resource_log.path(),
            error.into(),
        )
    }

    fn deployment_error(&self, step: ProvisioningStep, error: DeploymentError) -> EngineError {
        let details = self.details(step);
        let underlying: CommandError = error.clone().into();
        match error {
            DeploymentError::CannotCreateRepository { repository_name, .. } => {
                EngineError::new_cannot_create_repository(details, &repository_name, underlying)
            }
            DeploymentError::CannotBuildImage { image, .. } => {
                EngineError::new_cannot_build_image(details, &image, underlying)
            }
            DeploymentError::CannotLoginToRegistry { registry: image, .. }
            | DeploymentError::CannotPushImage { image, .. } => {
                EngineError::new_cannot_push_image(details, &image, underlying)
            }
            DeploymentError::CannotDeployService { service_name, .. }
            | DeploymentError::CannotGetServiceUrl { service_name, .. } => {
                EngineError::new_cannot_deploy_service(details, &service_name, underlying)
            }
            _ => EngineError::new_unknown(details, "Unexpected deployment error.".to_string(), Some(underlying), None),
        }
    }

    /// Fails with `AlreadyProvisioned` while a previous setup is still tracked.
    fn open_resource_log(&self) -> Result<ResourceLog, EngineError> {
        let path = &self.config.resource_log_path;
        let details = EventDetails::clone_changing_stage(&self.event_details, Stage::General(GeneralStep::LoadResourceLog));

        match ResourceLog::load(path)
            .map_err(|e| EngineError::new_cannot_read_resource_log(details.clone(), path, e.into()))?
        {
            Some(resource_log) if !resource_log.is_empty() => Err(EngineError::new_already_provisioned(
                details,
                path,
                resource_log.resources().descriptions(),
            )),
            _ => Ok(ResourceLog::new(path, self.credentials.project_id())),
        }
    }

    /// Creates the bucket and deploys the image; each resource is tracked as soon as it exists.
    pub fn provision(&self) -> Result<Provisioned, EngineError> {
        let mut resource_log = self.open_resource_log()?;
        let short_id = self.event_details.execution_id().short().to_string();

        // bucket
        let bucket_name = generate_bucket_name();
        let bucket = self
            .object_storage
            .create_bucket(&bucket_name, Some(bucket_labels()))
            .map_err(|e| match e {
                ObjectStorageError::BucketAlreadyExists { .. } => {
                    EngineError::new_bucket_already_exists(self.details(ProvisioningStep::CreateBucket), &bucket_name)
                }
                e => EngineError::new_cannot_create_bucket(
                    self.details(ProvisioningStep::CreateBucket),
                    &bucket_name,
                    e.into(),
                ),
            })?;
        resource_log
            .track_bucket(&bucket.name)
            .map_err(|e| self.write_error(&resource_log, e))?;
        self.info(
            ProvisioningStep::CreateBucket,
            format!("Bucket `{}` created in {}", bucket.name, bucket.location),
        );

        // repository
        match self
            .deployment_target
            .ensure_repository(&labels())
            .map_err(|e| self.deployment_error(ProvisioningStep::CreateRepository, e))?
        {
            RepositoryOutcome::Created(repository) => {
                resource_log
                    .track_repository(&repository.name, repository.region)
                    .map_err(|e| self.write_error(&resource_log, e))?;
                self.info(
                    ProvisioningStep::CreateRepository,
                    format!("Repository `{}` created in {}", repository.name, repository.region),
                );
            }
            RepositoryOutcome::AlreadyExists(repository) => self.info(
                ProvisioningStep::CreateRepository,
                format!("Reusing existing repository `{}` in {}", repository.name, repository.region),
            ),
        }

        // image
        self.info(
            ProvisioningStep::BuildImage,
            format!(
                "Building image `{}:{}` from {}",
                self.config.image_name,
                short_id,
                self.config.context_dir.display()
            ),
        );
        let image = self
            .deployment_target
            .build_and_push_image(&ImageBuild {
                name: self.config.image_name.to_string(),
                tag: short_id.to_string(),
                context_dir: self.config.context_dir.clone(),
                dockerfile: self.config.dockerfile.clone(),
            })
            .map_err(|e| self.deployment_error(ProvisioningStep::BuildImage, e))?;
        resource_log
            .track_image(&image)
            .map_err(|e| self.write_error(&resource_log, e))?;
        self.info(ProvisioningStep::PushImage, format!("Image `{image}` pushed"));

        // service
        let service = self
            .deployment_target
            .deploy_service(&ServiceDeployment {
                name: format!("{SERVICE_NAME_PREFIX}{short_id}"),
                image: image.to_string(),
                port: self.config.container_port,
                env_vars: vec![
                    ("GCP_PROJECT".to_string(), self.credentials.project_id().to_string()),
                    ("AUTOMATION_BUCKET".to_string(), bucket.name.to_string()),
                ],
                labels: labels(),
            })
            .map_err(|e| self.deployment_error(ProvisioningStep::DeployService, e))?;
        resource_log
            .track_service(service.clone())
            .map_err(|e| self.write_error(&resource_log, e))?;

        let service_url = self
            .deployment_target
            .service_url(&service)
            .map_err(|e| self.deployment_error(ProvisioningStep::DeployService, e))?;
        resource_log
            .set_service_url(&service.name, service_url.as_str())
            .map_err(|e| self.write_error(&resource_log, e))?;
        self.info(
            ProvisioningStep::DeployService,
            format!("Service `{}` deployed on {} at {}", service.name, self.deployment_target.name(), service_url),
        );

        Ok(Provisioned {
            bucket_name: bucket.name,
            image,
            service: TrackedService {
                url: Some(service_url.to_string()),
                ..service
            },
            service_url,
        })
    }

    /// Polls the service until it answers anything but a server error.
    pub fn wait_for_service(&self, service_url: &Url) -> Result<(), EngineError> {
        let details = self.details(ProvisioningStep::WaitForService);
        let client = Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| {
                EngineError::new_service_not_reachable(
                    details.clone(),
                    service_url.as_str(),
                    CommandError::new("Cannot build HTTP client".to_string(), Some(e.to_string()), None),
                )
            })?;

        let ret = retry::retry(
            // the first request is not a retry
            Fibonacci::from(Duration::from_secs(1)).take(self.config.readiness_attempts.saturating_sub(1)),
            || match client.get(service_url.clone()).send() {
                Ok(response) if !response.status().is_server_error() => OperationResult::Ok(response.status()),
                Ok(response) => {
                    debug!("Service {} not ready yet: {}", service_url, response.status());
                    OperationResult::Retry(format!("status {}", response.status()))
                }
                Err(e) => {
                    debug!("Service {} not ready yet: {}", service_url, e);
                    OperationResult::Retry(e.to_string())
                }
            },
        );

        match ret {
            Ok(status) => {
                self.info(
                    ProvisioningStep::WaitForService,
                    format!("Service {service_url} is ready ({status})"),
                );
                Ok(())
            }
            Err(e) => Err(EngineError::new_service_not_reachable(
                details,
                service_url.as_str(),
                CommandError::new(
                    format!("No answer after {} tries", e.tries),
                    Some(e.error),
                    None,
                ),
            )),
        }
    }

    /// Full setup: provision, wait for the service, run the tests, write and upload the report.
    pub fn setup(&self, test_runner: &TestRunner, uploader: &Uploader) -> Result<SetupOutcome, EngineError> {
        let provisioned = self.provision()?;
        self.wait_for_service(&provisioned.service_url)?;

        let report = test_runner.run(&provisioned.service_url, &provisioned.service.name)?;
        let report_details = EventDetails::clone_changing_stage(&self.event_details, Stage::Testing(TestingStep::GenerateReport));
        let report_path = write_report(&report, &self.config.output_dir)
            .map_err(|e| EngineError::new_cannot_generate_report(report_details.clone(), e.into()))?;
        self.logger.log(EngineEvent::Info(
            report_details,
            EventMessage::new_from_safe(format!("Report written to {}", report_path.display())),
        ));

        let uploaded = uploader.upload(&provisioned.bucket_name, &self.config.output_dir, &report)?;

        self.logger.log(EngineEvent::Info(
            self.details(ProvisioningStep::Provisioned),
            EventMessage::new_from_safe(format!(
                "Setup done: {} passed, {} failed, report at gs://{}/{}",
                report.passed(),
                report.failed(),
                provisioned.bucket_name,
                REPORT_FILE_NAME
            )),
        ));

        Ok(SetupOutcome {
            provisioned,
            report,
            uploaded,
        })
    }
}
