pub mod cloud_run;

use crate::resource_log::{TrackedRepository, TrackedService};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum DeploymentError {
    #[error("Cannot ensure repository `{repository_name}` exists: {raw_error_message:?}.")]
    CannotCreateRepository {
        repository_name: String,
        raw_error_message: String,
    },
    #[error("Cannot login to registry `{registry}`: {raw_error_message:?}.")]
    CannotLoginToRegistry { registry: String, raw_error_message: String },
    #[error("Cannot build image `{image}`: {raw_error_message:?}.")]
    CannotBuildImage { image: String, raw_error_message: String },
    #[error("Cannot push image `{image}`: {raw_error_message:?}.")]
    CannotPushImage { image: String, raw_error_message: String },
    #[error("Cannot deploy service `{service_name}`: {raw_error_message:?}.")]
    CannotDeployService {
        service_name: String,
        raw_error_message: String,
    },
    #[error("Cannot get service `{service_name}` URL: {raw_error_message:?}.")]
    CannotGetServiceUrl {
        service_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete service `{service_name}`: {raw_error_message:?}.")]
    CannotDeleteService {
        service_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete image `{image}`: {raw_error_message:?}.")]
    CannotDeleteImage { image: String, raw_error_message: String },
    #[error("Cannot delete repository `{repository_name}`: {raw_error_message:?}.")]
    CannotDeleteRepository {
        repository_name: String,
        raw_error_message: String,
    },
}

impl DeploymentError {
    pub fn get_raw_error_message(self) -> String {
        match self {
            DeploymentError::CannotCreateRepository { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotLoginToRegistry { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotBuildImage { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotPushImage { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotDeployService { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotGetServiceUrl { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotDeleteService { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotDeleteImage { raw_error_message, .. } => raw_error_message,
            DeploymentError::CannotDeleteRepository { raw_error_message, .. } => raw_error_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Created(TrackedRepository),
    AlreadyExists(TrackedRepository),
}

/// Container image to build from a local context directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
    pub name: String,
    pub tag: String,
    pub context_dir: PathBuf,
    /// Relative to `context_dir`.
    pub dockerfile: PathBuf,
}

/// Service running a pushed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDeployment {
    pub name: String,
    pub image: String,
    pub port: u16,
    pub env_vars: Vec<(String, String)>,
    pub labels: HashMap<String, String>,
}

/// Where container images are stored and run.
/// Every creation returns what must be tracked for a later deletion.
pub trait DeploymentTarget {
    fn name(&self) -> &str;

    /// Creates the image repository unless it already exists.
    fn ensure_repository(&self, labels: &HashMap<String, String>) -> Result<RepositoryOutcome, DeploymentError>;

    /// Builds and pushes the image, returns its full reference.
    fn build_and_push_image(&self, image: &ImageBuild) -> Result<String, DeploymentError>;

    /// Deploys the service, returns it for tracking, its URL is read afterwards.
    fn deploy_service(&self, deployment: &ServiceDeployment) -> Result<TrackedService, DeploymentError>;

    /// Public URL of a deployed service.
    fn service_url(&self, service: &TrackedService) -> Result<Url, DeploymentError>;

    fn delete_service(&self, service: &TrackedService) -> Result<(), DeploymentError>;
    fn delete_image(&self, image: &str) -> Result<(), DeploymentError>;
    fn delete_repository(&self, repository: &TrackedRepository) -> Result<(), DeploymentError>;
}
