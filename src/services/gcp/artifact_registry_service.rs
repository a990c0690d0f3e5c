use crate::cmd::gcloud::Gcloud;
use crate::models::ToCloudProviderFormat;
use crate::models::gcp::regions::GcpRegion;
use itertools::Itertools;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum ArtifactRegistryServiceError {
    #[error("Cannot list repositories in `{location}`: {raw_error_message:?}")]
    CannotListRepositories {
        location: String,
        raw_error_message: String,
    },
    #[error("Cannot create repository `{repository_name}`: {raw_error_message:?}")]
    CannotCreateRepository {
        repository_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete repository `{repository_name}`: {raw_error_message:?}")]
    CannotDeleteRepository {
        repository_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete Docker image `{image}`: {raw_error_message:?}")]
    CannotDeleteDockerImage { image: String, raw_error_message: String },
}

impl ArtifactRegistryServiceError {
    pub fn get_raw_error_message(self) -> String {
        match self {
            ArtifactRegistryServiceError::CannotListRepositories { raw_error_message, .. } => raw_error_message,
            ArtifactRegistryServiceError::CannotCreateRepository { raw_error_message, .. } => raw_error_message,
            ArtifactRegistryServiceError::CannotDeleteRepository { raw_error_message, .. } => raw_error_message,
            ArtifactRegistryServiceError::CannotDeleteDockerImage { raw_error_message, .. } => raw_error_message,
        }
    }
}

/// Docker repositories of Artifact Registry, driven through `gcloud artifacts`.
pub struct ArtifactRegistryService {
    gcloud: Gcloud,
}

impl ArtifactRegistryService {
    pub fn new(gcloud: Gcloud) -> Self {
        ArtifactRegistryService { gcloud }
    }

    pub fn repository_exists(
        &self,
        location: GcpRegion,
        repository_name: &str,
    ) -> Result<bool, ArtifactRegistryServiceError> {
        let location_arg = format!("--location={}", location.to_cloud_provider_format());
        let output = self
            .gcloud
            .exec(&[
                "artifacts",
                "repositories",
                "list",
                location_arg.as_str(),
                "--format=value(name)",
            ])
            .map_err(|e| ArtifactRegistryServiceError::CannotListRepositories {
                location: location.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })?;

        Ok(contains_repository(&output, repository_name))
    }

    pub fn create_repository(
        &self,
        location: GcpRegion,
        repository_name: &str,
        labels: HashMap<String, String>,
    ) -> Result<(), ArtifactRegistryServiceError> {
        let location_arg = format!("--location={}", location.to_cloud_provider_format());
        let mut args = vec![
            "artifacts".to_string(),
            "repositories".to_string(),
            "create".to_string(),
            repository_name.to_string(),
            "--repository-format=docker".to_string(),
            location_arg,
        ];
        if !labels.is_empty() {
            args.push(format!("--labels={}", labels_arg(&labels)));
        }

        self.gcloud
            .exec(&args.iter().map(String::as_str).collect::<Vec<&str>>())
            .map(|_| ())
            .map_err(|e| ArtifactRegistryServiceError::CannotCreateRepository {
                repository_name: repository_name.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })
    }

    pub fn delete_repository(&self, location: GcpRegion, repository_name: &str) -> Result<(), ArtifactRegistryServiceError> {
        let location_arg = format!("--location={}", location.to_cloud_provider_format());

        self.gcloud
            .exec(&["artifacts", "repositories", "delete", repository_name, location_arg.as_str()])
            .map(|_| ())
            .map_err(|e| ArtifactRegistryServiceError::CannotDeleteRepository {
                repository_name: repository_name.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })
    }

    /// Deletes the image digest along with every tag pointing to it.
    pub fn delete_docker_image(&self, image: &str) -> Result<(), ArtifactRegistryServiceError> {
        self.gcloud
            .exec(&["artifacts", "docker", "images", "delete", image, "--delete-tags"])
            .map(|_| ())
            .map_err(|e| ArtifactRegistryServiceError::CannotDeleteDockerImage {
                image: image.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })
    }
}

/// `gcloud` lists full resource names: `projects/<p>/locations/<l>/repositories/<name>`.
fn contains_repository(listed_repositories: &[String], repository_name: &str) -> bool {
    listed_repositories
        .iter()
        .map(|line| line.trim())
        .any(|line| line == repository_name || line.rsplit('/').next() == Some(repository_name))
}

/// Sorted `k=v` pairs, keeps the command line stable.
pub(crate) fn labels_arg(labels: &HashMap<String, String>) -> String {
    labels
        .iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(k, v)| format!("{k}={v}"))
        .join(",")
}
