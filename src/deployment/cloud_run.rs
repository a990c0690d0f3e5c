use crate::cmd::command::CommandKiller;
use crate::cmd::docker::{ContainerImage, Docker};
use crate::cmd::gcloud::Gcloud;
use crate::deployment::{
    DeploymentError, DeploymentTarget, ImageBuild, RepositoryOutcome, ServiceDeployment,
};
use crate::models::gcp::regions::GcpRegion;
use crate::resource_log::{TrackedRepository, TrackedService};
use crate::services::gcp::artifact_registry_service::ArtifactRegistryService;
use crate::services::gcp::auth_service::GoogleAuthService;
use crate::services::gcp::cloud_run_service::{CloudRunService, CloudRunServiceSpec};
use retry::delay::Fibonacci;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Artifact Registry stores the image, Cloud Run serves it.
/// Without docker, tracked resources can still be deleted but nothing can be built.
pub struct CloudRun {
    name: String,
    project_id: String,
    region: GcpRegion,
    repository_name: String,
    build_timeout: Duration,
    gcloud: Gcloud,
    docker: Option<Docker>,
    artifact_registry: ArtifactRegistryService,
    cloud_run: CloudRunService,
}

impl CloudRun {
    pub fn new(gcloud: Gcloud, docker: Option<Docker>, region: GcpRegion, repository_name: &str) -> Self {
        CloudRun {
            name: "cloud-run".to_string(),
            project_id: gcloud.project_id().to_string(),
            region,
            repository_name: repository_name.to_string(),
            build_timeout: Duration::from_secs(30 * 60),
            artifact_registry: ArtifactRegistryService::new(gcloud.clone()),
            cloud_run: CloudRunService::new(gcloud.clone()),
            gcloud,
            docker,
        }
    }

    /// Registry URL carrying a fresh access token as password.
    fn registry_url_with_credentials(&self) -> Result<Url, DeploymentError> {
        let registry_error = |raw_error_message: String| DeploymentError::CannotLoginToRegistry {
            registry: self.region.docker_registry_host(),
            raw_error_message,
        };

        let access_token = GoogleAuthService::print_access_token(&self.gcloud).map_err(|e| registry_error(e.to_string()))?;
        let mut registry = registry_url(self.region).map_err(|e| registry_error(e.to_string()))?;
        registry
            .set_username("oauth2accesstoken")
            .map_err(|_| registry_error("cannot set registry username".to_string()))?;
        registry
            .set_password(Some(access_token.as_str()))
            .map_err(|_| registry_error("cannot set registry password".to_string()))?;

        Ok(registry)
    }
}

fn registry_url(region: GcpRegion) -> Result<Url, url::ParseError> {
    Url::parse(format!("https://{}", region.docker_registry_host()).as_str())
}

/// `<region>-docker.pkg.dev/<project>/<repository>/<image>:<tag>`
fn container_image(
    project_id: &str,
    repository_name: &str,
    region: GcpRegion,
    image: &ImageBuild,
) -> Result<ContainerImage, url::ParseError> {
    Ok(ContainerImage::new(
        registry_url(region)?,
        format!("{}/{}/{}", project_id, repository_name, image.name),
        vec![image.tag.to_string()],
    ))
}

impl DeploymentTarget for CloudRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn ensure_repository(&self, labels: &HashMap<String, String>) -> Result<RepositoryOutcome, DeploymentError> {
        let repository = TrackedRepository {
            name: self.repository_name.to_string(),
            region: self.region,
        };
        let repository_error = |raw_error_message: String| DeploymentError::CannotCreateRepository {
            repository_name: self.repository_name.to_string(),
            raw_error_message,
        };

        if self
            .artifact_registry
            .repository_exists(self.region, &self.repository_name)
            .map_err(|e| repository_error(e.get_raw_error_message()))?
        {
            info!("Repository `{}` already exists in {}", self.repository_name, self.region);
            return Ok(RepositoryOutcome::AlreadyExists(repository));
        }

        self.artifact_registry
            .create_repository(self.region, &self.repository_name, labels.clone())
            .map_err(|e| repository_error(e.get_raw_error_message()))?;

        Ok(RepositoryOutcome::Created(repository))
    }

    fn build_and_push_image(&self, image: &ImageBuild) -> Result<String, DeploymentError> {
        let container_image = container_image(&self.project_id, &self.repository_name, self.region, image).map_err(
            |e| DeploymentError::CannotBuildImage {
                image: image.name.to_string(),
                raw_error_message: e.to_string(),
            },
        )?;
        let image_name = container_image.image_name().unwrap_or_else(|| container_image.name_without_tag());
        let docker = self.docker.as_ref().ok_or_else(|| DeploymentError::CannotBuildImage {
            image: image_name.to_string(),
            raw_error_message: "docker is not configured".to_string(),
        })?;

        let registry = self.registry_url_with_credentials()?;
        let login_ret = retry::retry(Fibonacci::from(Duration::from_secs(1)).take(4), || {
            docker.login(&registry).inspect_err(|_err| {
                warn!("Retrying to login to registry {} due to error...", self.region.docker_registry_host());
            })
        });
        if let Err(err) = login_ret {
            return Err(DeploymentError::CannotLoginToRegistry {
                registry: self.region.docker_registry_host(),
                raw_error_message: err.error.to_string(),
            });
        }

        let build_killer = CommandKiller::from_timeout(self.build_timeout);
        docker
            .build(
                &image.context_dir.join(&image.dockerfile),
                &image.context_dir,
                &container_image,
                &[],
                &mut |line| info!("{}", line),
                &mut |line| info!("{}", line),
                &build_killer,
            )
            .map_err(|e| DeploymentError::CannotBuildImage {
                image: image_name.to_string(),
                raw_error_message: e.to_string(),
            })?;

        let push_ret = docker.push(
            &container_image,
            &mut |line| info!("{}", line),
            &mut |line| warn!("{}", line),
            &CommandKiller::from_timeout(self.build_timeout),
        );

        // the local copy is not needed anymore, whatever the push outcome
        if let Err(err) = docker.remove_local_image(&container_image) {
            warn!("Cannot remove local image {}: {}", image_name, err);
        }

        push_ret.map_err(|e| DeploymentError::CannotPushImage {
            image: image_name.to_string(),
            raw_error_message: e.to_string(),
        })?;

        Ok(image_name)
    }

    fn deploy_service(&self, deployment: &ServiceDeployment) -> Result<TrackedService, DeploymentError> {
        self.cloud_run
            .deploy(&CloudRunServiceSpec {
                name: deployment.name.to_string(),
                image: deployment.image.to_string(),
                region: self.region,
                port: deployment.port,
                env_vars: deployment.env_vars.clone(),
                labels: deployment.labels.clone(),
            })
            .map_err(|e| DeploymentError::CannotDeployService {
                service_name: deployment.name.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })?;

        Ok(TrackedService {
            name: deployment.name.to_string(),
            region: self.region,
            url: None,
        })
    }

    fn service_url(&self, service: &TrackedService) -> Result<Url, DeploymentError> {
        self.cloud_run
            .get_service_url(&service.name, service.region)
            .map_err(|e| DeploymentError::CannotGetServiceUrl {
                service_name: service.name.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })
    }

    fn delete_service(&self, service: &TrackedService) -> Result<(), DeploymentError> {
        self.cloud_run
            .delete_service(&service.name, service.region)
            .map_err(|e| DeploymentError::CannotDeleteService {
                service_name: service.name.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })
    }

    fn delete_image(&self, image: &str) -> Result<(), DeploymentError> {
        self.artifact_registry
            .delete_docker_image(image)
            .map_err(|e| DeploymentError::CannotDeleteImage {
                image: image.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })
    }

    fn delete_repository(&self, repository: &TrackedRepository) -> Result<(), DeploymentError> {
        self.artifact_registry
            .delete_repository(repository.region, &repository.name)
            .map_err(|e| DeploymentError::CannotDeleteRepository {
                repository_name: repository.name.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })
    }
}
