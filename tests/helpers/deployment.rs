use crate::helpers::credentials::PROJECT_ID;
use gcp_automation::deployment::{
    DeploymentError, DeploymentTarget, ImageBuild, RepositoryOutcome, ServiceDeployment,
};
use gcp_automation::models::gcp::regions::GcpRegion;
use gcp_automation::resource_log::{TrackedRepository, TrackedService};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

pub const REPOSITORY_NAME: &str = "automation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    CreateRepository,
    Build,
    Push,
    Deploy,
    DeleteService,
    DeleteImage,
    DeleteRepository,
}

/// Deployment target answering from memory, every call is recorded.
pub struct FakeDeploymentTarget {
    service_url: Url,
    repository_exists: bool,
    failures: Vec<FakeFailure>,
    calls: Mutex<Vec<String>>,
}

impl FakeDeploymentTarget {
    pub fn new(service_url: &Url) -> Self {
        FakeDeploymentTarget {
            service_url: service_url.clone(),
            repository_exists: false,
            failures: vec![],
            calls: Mutex::new(vec![]),
        }
    }

    pub fn with_existing_repository(mut self) -> Self {
        self.repository_exists = true;
        self
    }

    pub fn failing_on(mut self, failure: FakeFailure) -> Self {
        self.failures.push(failure);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn fails_on(&self, failure: FakeFailure) -> bool {
        self.failures.contains(&failure)
    }
}

impl DeploymentTarget for FakeDeploymentTarget {
    fn name(&self) -> &str {
        "fake"
    }

    fn ensure_repository(&self, _labels: &HashMap<String, String>) -> Result<RepositoryOutcome, DeploymentError> {
        self.record("ensure_repository".to_string());
        if self.fails_on(FakeFailure::CreateRepository) {
            return Err(DeploymentError::CannotCreateRepository {
                repository_name: REPOSITORY_NAME.to_string(),
                raw_error_message: "PERMISSION_DENIED".to_string(),
            });
        }

        let repository = TrackedRepository {
            name: REPOSITORY_NAME.to_string(),
            region: GcpRegion::UsCentral1,
        };
        match self.repository_exists {
            true => Ok(RepositoryOutcome::AlreadyExists(repository)),
            false => Ok(RepositoryOutcome::Created(repository)),
        }
    }

    fn build_and_push_image(&self, image: &ImageBuild) -> Result<String, DeploymentError> {
        let image_name = format!(
            "us-central1-docker.pkg.dev/{}/{}/{}:{}",
            PROJECT_ID, REPOSITORY_NAME, image.name, image.tag
        );
        self.record(format!("build_and_push_image:{image_name}"));

        if self.fails_on(FakeFailure::Build) {
            return Err(DeploymentError::CannotBuildImage {
                image: image_name,
                raw_error_message: "failed to solve: dockerfile parse error".to_string(),
            });
        }
        if self.fails_on(FakeFailure::Push) {
            return Err(DeploymentError::CannotPushImage {
                image: image_name,
                raw_error_message: "denied: permission denied".to_string(),
            });
        }

        Ok(image_name)
    }

    fn deploy_service(&self, deployment: &ServiceDeployment) -> Result<TrackedService, DeploymentError> {
        self.record(format!("deploy_service:{}", deployment.name));
        if self.fails_on(FakeFailure::Deploy) {
            return Err(DeploymentError::CannotDeployService {
                service_name: deployment.name.to_string(),
                raw_error_message: "Revision is not ready".to_string(),
            });
        }

        Ok(TrackedService {
            name: deployment.name.to_string(),
            region: GcpRegion::UsCentral1,
            url: None,
        })
    }

    fn service_url(&self, _service: &TrackedService) -> Result<Url, DeploymentError> {
        Ok(self.service_url.clone())
    }

    fn delete_service(&self, service: &TrackedService) -> Result<(), DeploymentError> {
        self.record(format!("delete_service:{}", service.name));
        match self.fails_on(FakeFailure::DeleteService) {
            true => Err(DeploymentError::CannotDeleteService {
                service_name: service.name.to_string(),
                raw_error_message: "PERMISSION_DENIED".to_string(),
            }),
            false => Ok(()),
        }
    }

    fn delete_image(&self, image: &str) -> Result<(), DeploymentError> {
        self.record(format!("delete_image:{image}"));
        match self.fails_on(FakeFailure::DeleteImage) {
            true => Err(DeploymentError::CannotDeleteImage {
                image: image.to_string(),
                raw_error_message: "NOT_FOUND".to_string(),
            }),
            false => Ok(()),
        }
    }

    fn delete_repository(&self, repository: &TrackedRepository) -> Result<(), DeploymentError> {
        self.record(format!("delete_repository:{}", repository.name));
        match self.fails_on(FakeFailure::DeleteRepository) {
            true => Err(DeploymentError::CannotDeleteRepository {
                repository_name: repository.name.to_string(),
                raw_error_message: "FAILED_PRECONDITION".to_string(),
            }),
            false => Ok(()),
        }
    }
}
