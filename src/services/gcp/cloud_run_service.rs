use crate::cmd::gcloud::Gcloud;
use crate::models::ToCloudProviderFormat;
use crate::models::gcp::regions::GcpRegion;
use crate::services::gcp::artifact_registry_service::labels_arg;
use itertools::Itertools;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum CloudRunServiceError {
    #[error("Cannot deploy cloud run service `{service_name}`: {raw_error_message:?}")]
    CannotDeployService {
        service_name: String,
        raw_error_message: String,
    },
    #[error("Cannot get cloud run service `{service_name}` URL: {raw_error_message:?}")]
    CannotGetServiceUrl {
        service_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete cloud run service `{service_name}`: {raw_error_message:?}")]
    CannotDeleteService {
        service_name: String,
        raw_error_message: String,
    },
}

impl CloudRunServiceError {
    pub fn get_raw_error_message(self) -> String {
        match self {
            CloudRunServiceError::CannotDeployService { raw_error_message, .. } => raw_error_message,
            CloudRunServiceError::CannotGetServiceUrl { raw_error_message, .. } => raw_error_message,
            CloudRunServiceError::CannotDeleteService { raw_error_message, .. } => raw_error_message,
        }
    }
}

/// What to run and how to expose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudRunServiceSpec {
    pub name: String,
    pub image: String,
    pub region: GcpRegion,
    pub port: u16,
    pub env_vars: Vec<(String, String)>,
    pub labels: HashMap<String, String>,
}

/// Managed Cloud Run services, driven through `gcloud run`.
pub struct CloudRunService {
    gcloud: Gcloud,
}

impl CloudRunService {
    pub fn new(gcloud: Gcloud) -> Self {
        CloudRunService { gcloud }
    }

    /// Deploys a publicly reachable service and waits for its first revision to be serving.
    pub fn deploy(&self, spec: &CloudRunServiceSpec) -> Result<(), CloudRunServiceError> {
        self.gcloud
            .exec(&deploy_args(spec).iter().map(String::as_str).collect::<Vec<&str>>())
            .map(|_| ())
            .map_err(|e| CloudRunServiceError::CannotDeployService {
                service_name: spec.name.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })
    }

    pub fn get_service_url(&self, service_name: &str, region: GcpRegion) -> Result<Url, CloudRunServiceError> {
        let region_arg = format!("--region={}", region.to_cloud_provider_format());
        let output = self
            .gcloud
            .exec(&[
                "run",
                "services",
                "describe",
                service_name,
                region_arg.as_str(),
                "--format=value(status.url)",
            ])
            .map_err(|e| CloudRunServiceError::CannotGetServiceUrl {
                service_name: service_name.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })?;

        let raw_url = output
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        Url::parse(raw_url).map_err(|e| CloudRunServiceError::CannotGetServiceUrl {
            service_name: service_name.to_string(),
            raw_error_message: format!("`{raw_url}` is not a valid URL: {e}"),
        })
    }

    pub fn delete_service(&self, service_name: &str, region: GcpRegion) -> Result<(), CloudRunServiceError> {
        let region_arg = format!("--region={}", region.to_cloud_provider_format());

        self.gcloud
            .exec(&["run", "services", "delete", service_name, region_arg.as_str()])
            .map(|_| ())
            .map_err(|e| CloudRunServiceError::CannotDeleteService {
                service_name: service_name.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })
    }
}

fn deploy_args(spec: &CloudRunServiceSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "deploy".to_string(),
        spec.name.to_string(),
        format!("--image={}", spec.image),
        format!("--region={}", spec.region.to_cloud_provider_format()),
        "--platform=managed".to_string(),
        "--allow-unauthenticated".to_string(),
        format!("--port={}", spec.port),
    ];

    if !spec.env_vars.is_empty() {
        args.push(format!(
            "--set-env-vars={}",
            spec.env_vars.iter().map(|(k, v)| format!("{k}={v}")).join(",")
        ));
    }
    if !spec.labels.is_empty() {
        args.push(format!("--labels={}", labels_arg(&spec.labels)));
    }

    args
}
