use crate::deployment::DeploymentTarget;
use crate::errors::{CommandError, EngineError};
use crate::events::{EngineEvent, EventDetails, EventMessage, GeneralStep, ReclaimStep, Stage};
use crate::logger::Logger;
use crate::object_storage::{BucketDeleteStrategy, ObjectStorage};
use crate::resource_log::{ResourceLog, TrackedResource, TrackedResources};
use std::path::{Path, PathBuf};

/// What `reset` went through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReclaimOutcome {
    pub deleted: Vec<String>,
}

/// Deletes every tracked resource, services first and buckets last.
pub struct Reclaimer<'a> {
    object_storage: &'a dyn ObjectStorage,
    deployment_target: &'a dyn DeploymentTarget,
    resource_log_path: PathBuf,
    logger: Box<dyn Logger>,
    event_details: EventDetails,
}

impl<'a> Reclaimer<'a> {
    pub fn new(
        object_storage: &'a dyn ObjectStorage,
        deployment_target: &'a dyn DeploymentTarget,
        resource_log_path: &Path,
        logger: Box<dyn Logger>,
        event_details: &EventDetails,
    ) -> Self {
        Reclaimer {
            object_storage,
            deployment_target,
            resource_log_path: resource_log_path.to_path_buf(),
            logger,
            event_details: event_details.clone(),
        }
    }

    fn details(&self, step: ReclaimStep) -> EventDetails {
        EventDetails::clone_changing_stage(&self.event_details, Stage::Reclaim(step))
    }

    fn delete(&self, resource: &TrackedResource) -> Result<(), CommandError> {
        match resource {
            TrackedResource::Service(service) => self.deployment_target.delete_service(service).map_err(|e| e.into()),
            TrackedResource::Image(image) => self.deployment_target.delete_image(image).map_err(|e| e.into()),
            TrackedResource::Repository(repository) => {
                self.deployment_target.delete_repository(repository).map_err(|e| e.into())
            }
            TrackedResource::Bucket(bucket_name) => self
                .object_storage
                .delete_bucket(bucket_name, BucketDeleteStrategy::HardDelete)
                .map_err(|e| e.into()),
        }
    }

    pub fn reclaim(&self) -> Result<ReclaimOutcome, EngineError> {
        let load_details =
            EventDetails::clone_changing_stage(&self.event_details, Stage::General(GeneralStep::LoadResourceLog));
        let mut resource_log = match ResourceLog::load(&self.resource_log_path).map_err(|e| {
            EngineError::new_cannot_read_resource_log(load_details.clone(), &self.resource_log_path, e.into())
        })? {
            Some(resource_log) => resource_log,
            None => {
                self.logger.log(EngineEvent::Info(
                    load_details,
                    EventMessage::new_from_safe("No resource log found, nothing to delete".to_string()),
                ));
                return Ok(ReclaimOutcome::default());
            }
        };

        // an old log without project is trusted
        if let Some(logged_project_id) = resource_log.resources().project_id.as_deref() {
            if logged_project_id != self.event_details.project_id().trim() {
                return Err(EngineError::new_resource_log_project_mismatch(
                    load_details,
                    &self.resource_log_path,
                    logged_project_id,
                ));
            }
        }

        let tracked = resource_log.resources().clone();
        let mut remaining = TrackedResources::default();
        let mut outcome = ReclaimOutcome::default();

        for resource in tracked.in_deletion_order() {
            let step = step_for(&resource);
            match self.delete(&resource) {
                Ok(()) => {
                    self.logger.log(EngineEvent::Info(
                        self.details(step),
                        EventMessage::new_from_safe(format!("Deleted {resource}")),
                    ));
                    outcome.deleted.push(resource.to_string());
                }
                Err(e) => {
                    self.logger.log(EngineEvent::Warning(
                        self.details(step),
                        EventMessage::new(format!("Cannot delete {resource}: {}", e.message_safe()), e.message_raw()),
                    ));
                    remaining.push(resource);
                }
            }
        }

        resource_log.replace_with(remaining.clone()).map_err(|e| {
            EngineError::new_cannot_write_resource_log(
                EventDetails::clone_changing_stage(&self.event_details, Stage::General(GeneralStep::SaveResourceLog)),
                &self.resource_log_path,
                e.into(),
            )
        })?;

        if !remaining.is_empty() {
            return Err(EngineError::new_reclaim_incomplete(
                self.details(ReclaimStep::ReclaimError),
                remaining.descriptions(),
            ));
        }

        self.logger.log(EngineEvent::Info(
            self.details(ReclaimStep::Reclaimed),
            EventMessage::new_from_safe(format!("{} resource(s) deleted", outcome.deleted.len())),
        ));
        Ok(outcome)
    }
}

fn step_for(resource: &TrackedResource) -> ReclaimStep {
    match resource {
        TrackedResource::Service(_) => ReclaimStep::DeleteService,
        TrackedResource::Image(_) => ReclaimStep::DeleteImage,
        TrackedResource::Repository(_) => ReclaimStep::DeleteRepository,
        TrackedResource::Bucket(_) => ReclaimStep::DeleteBucket,
    }
}
