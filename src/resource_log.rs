use crate::models::gcp::regions::GcpRegion;
use serde_derive::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_RESOURCE_LOG_FILE: &str = "gcp_created_resources.json";

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum ResourceLogError {
    #[error("Cannot read resource log `{path}`: {raw_error_message:?}.")]
    CannotRead { path: String, raw_error_message: String },
    #[error("Resource log `{path}` is not valid: {raw_error_message:?}.")]
    CannotParse { path: String, raw_error_message: String },
    #[error("Cannot write resource log `{path}`: {raw_error_message:?}.")]
    CannotWrite { path: String, raw_error_message: String },
    #[error("Cannot remove resource log `{path}`: {raw_error_message:?}.")]
    CannotRemove { path: String, raw_error_message: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackedRepository {
    pub name: String,
    pub region: GcpRegion,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackedService {
    pub name: String,
    pub region: GcpRegion,
    pub url: Option<String>,
}

/// Every resource created by this tool and not deleted yet.
/// Missing keys default to empty so older logs listing only buckets still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackedResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub buckets: Vec<String>,
    #[serde(default)]
    pub repositories: Vec<TrackedRepository>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub services: Vec<TrackedService>,
}

impl TrackedResources {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.repositories.is_empty() && self.images.is_empty() && self.services.is_empty()
    }

    /// Services, then images, then repositories, then buckets.
    pub fn in_deletion_order(&self) -> Vec<TrackedResource> {
        self.services
            .iter()
            .cloned()
            .map(TrackedResource::Service)
            .chain(self.images.iter().cloned().map(TrackedResource::Image))
            .chain(self.repositories.iter().cloned().map(TrackedResource::Repository))
            .chain(self.buckets.iter().cloned().map(TrackedResource::Bucket))
            .collect()
    }

    /// Human readable list, in deletion order.
    pub fn descriptions(&self) -> Vec<String> {
        self.in_deletion_order().iter().map(|r| r.to_string()).collect()
    }

    /// Tracks `resource` again, used to keep what could not be deleted.
    pub fn push(&mut self, resource: TrackedResource) {
        match resource {
            TrackedResource::Service(service) => self.services.push(service),
            TrackedResource::Image(image) => self.images.push(image),
            TrackedResource::Repository(repository) => self.repositories.push(repository),
            TrackedResource::Bucket(bucket_name) => self.buckets.push(bucket_name),
        }
    }
}

/// One tracked resource, as handed to the reclaimer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedResource {
    Service(TrackedService),
    Image(String),
    Repository(TrackedRepository),
    Bucket(String),
}

impl Display for TrackedResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackedResource::Service(s) => write!(f, "service `{}` ({})", s.name, s.region),
            TrackedResource::Image(i) => write!(f, "image `{i}`"),
            TrackedResource::Repository(r) => write!(f, "repository `{}` ({})", r.name, r.region),
            TrackedResource::Bucket(b) => write!(f, "bucket `{b}`"),
        }
    }
}

/// Resource log file, persisted after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLog {
    path: PathBuf,
    resources: TrackedResources,
}

impl ResourceLog {
    /// Empty log, nothing is written until a resource is tracked.
    pub fn new(path: &Path, project_id: &str) -> Self {
        ResourceLog {
            path: path.to_path_buf(),
            resources: TrackedResources {
                project_id: Some(project_id.to_string()),
                ..Default::default()
            },
        }
    }

    /// Returns `None` when there is no log file.
    pub fn load(path: &Path) -> Result<Option<Self>, ResourceLogError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| ResourceLogError::CannotRead {
            path: path.to_string_lossy().to_string(),
            raw_error_message: e.to_string(),
        })?;

        let resources: TrackedResources =
            serde_json::from_str(&content).map_err(|e| ResourceLogError::CannotParse {
                path: path.to_string_lossy().to_string(),
                raw_error_message: e.to_string(),
            })?;

        Ok(Some(ResourceLog {
            path: path.to_path_buf(),
            resources,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resources(&self) -> &TrackedResources {
        &self.resources
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn track_bucket(&mut self, bucket_name: &str) -> Result<(), ResourceLogError> {
        self.resources.buckets.push(bucket_name.to_string());
        self.save()
    }

    pub fn track_repository(&mut self, repository_name: &str, region: GcpRegion) -> Result<(), ResourceLogError> {
        self.resources.repositories.push(TrackedRepository {
            name: repository_name.to_string(),
            region,
        });
        self.save()
    }

    pub fn track_image(&mut self, image: &str) -> Result<(), ResourceLogError> {
        self.resources.images.push(image.to_string());
        self.save()
    }

    pub fn track_service(&mut self, service: TrackedService) -> Result<(), ResourceLogError> {
        self.resources.services.push(service);
        self.save()
    }

    /// Sets the URL of an already tracked service.
    pub fn set_service_url(&mut self, service_name: &str, url: &str) -> Result<(), ResourceLogError> {
        for service in self.resources.services.iter_mut().filter(|s| s.name == service_name) {
            service.url = Some(url.to_string());
        }
        self.save()
    }

    /// Keeps only `remaining`; the file is removed once nothing is left.
    pub fn replace_with(&mut self, remaining: TrackedResources) -> Result<(), ResourceLogError> {
        self.resources = TrackedResources {
            project_id: self.resources.project_id.clone(),
            ..remaining
        };

        match self.resources.is_empty() {
            true => self.remove(),
            false => self.save(),
        }
    }

    pub fn save(&self) -> Result<(), ResourceLogError> {
        let write_error = |e: String| ResourceLogError::CannotWrite {
            path: self.path.to_string_lossy().to_string(),
            raw_error_message: e,
        };

        let content = serde_json::to_string_pretty(&self.resources).map_err(|e| write_error(e.to_string()))?;

        // write aside then rename, a crash never leaves a truncated log
        let mut tmp_file_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_file_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_file_name);
        fs::write(&tmp_path, content).map_err(|e| write_error(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| write_error(e.to_string()))
    }

    pub fn remove(&self) -> Result<(), ResourceLogError> {
        match fs::remove_file(&self.path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ResourceLogError::CannotRemove {
                path: self.path.to_string_lossy().to_string(),
                raw_error_message: e.to_string(),
            }),
        }
    }
}
