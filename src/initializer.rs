use crate::cmd::gcloud::Gcloud;
use crate::errors::{CommandError, EngineError};
use crate::events::{CredentialsStep, EngineEvent, EventDetails, EventMessage, Stage};
use crate::logger::Logger;
use crate::models::gcp::{CredentialsError, CredentialsFile};
use crate::object_storage::ObjectStorage;
use crate::services::gcp::auth_service::GoogleAuthService;
use std::path::Path;

/// Service account key checked against Google Cloud.
/// Only `CredentialInitializer` builds it, resource operations require one.
#[derive(Debug, Clone)]
pub struct ValidatedCredentials {
    credentials_file: CredentialsFile,
    project_id: String,
}

impl ValidatedCredentials {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn service_account_email(&self) -> &str {
        &self.credentials_file.credentials().client_email
    }

    /// `gcloud` scoped to the validated project.
    pub fn gcloud(&self) -> Gcloud {
        Gcloud::new(&self.project_id)
    }
}

pub struct CredentialInitializer {
    logger: Box<dyn Logger>,
    event_details: EventDetails,
}

impl CredentialInitializer {
    pub fn new(logger: Box<dyn Logger>, event_details: &EventDetails) -> Self {
        CredentialInitializer {
            logger,
            event_details: event_details.clone(),
        }
    }

    fn details(&self, step: CredentialsStep) -> EventDetails {
        EventDetails::clone_changing_stage(&self.event_details, Stage::Credentials(step))
    }

    /// Loads the key file and checks it is usable for `project_id`, without calling Google Cloud.
    pub fn load(&self, credentials_path: &Path, project_id: &str) -> Result<CredentialsFile, EngineError> {
        let details = self.details(CredentialsStep::Load);

        if project_id.trim().is_empty() {
            return Err(EngineError::new_credentials_invalid(
                details,
                CommandError::new_from_safe_message("Project id cannot be empty.".to_string()),
            ));
        }

        let credentials_file = CredentialsFile::load(credentials_path).map_err(|e| match e {
            CredentialsError::FileNotFound { .. } => {
                EngineError::new_credentials_file_not_found(details.clone(), credentials_path)
            }
            other => EngineError::new_credentials_invalid(details.clone(), CommandError::from(other)),
        })?;

        // cross project service accounts are legit
        if credentials_file.credentials().project_id != project_id {
            self.logger.log(EngineEvent::Warning(
                details,
                EventMessage::new_from_safe(format!(
                    "Service account belongs to project `{}`, resources will be created in project `{}`",
                    credentials_file.credentials().project_id,
                    project_id
                )),
            ));
        }

        Ok(credentials_file)
    }

    /// Loads the key file then lets `verify` prove it against Google Cloud, `verify` returns the number of buckets it sees.
    pub fn initialize<F>(
        &self,
        credentials_path: &Path,
        project_id: &str,
        verify: F,
    ) -> Result<ValidatedCredentials, EngineError>
    where
        F: FnOnce(&CredentialsFile) -> Result<usize, CommandError>,
    {
        let credentials_file = self.load(credentials_path, project_id)?;

        let bucket_count = verify(&credentials_file)
            .map_err(|e| EngineError::new_credentials_rejected(self.details(CredentialsStep::Verify), e))?;

        self.logger.log(EngineEvent::Info(
            self.details(CredentialsStep::Verified),
            EventMessage::new_from_safe(format!(
                "GCP access verified for {}, found {} buckets",
                credentials_file.credentials().client_email,
                bucket_count
            )),
        ));

        Ok(ValidatedCredentials {
            credentials_file,
            project_id: project_id.trim().to_string(),
        })
    }
}

/// Activates the service account for `gcloud` then lists the project's buckets with the storage SDK.
pub fn verify_with_google_cloud(
    gcloud: &Gcloud,
    credentials_file: &CredentialsFile,
    object_storage: &dyn ObjectStorage,
) -> Result<usize, CommandError> {
    GoogleAuthService::activate_service_account(gcloud, credentials_file).map_err(|e| {
        CommandError::new(
            format!(
                "Cannot activate service account `{}`",
                credentials_file.credentials().client_email
            ),
            Some(e.to_string()),
            None,
        )
    })?;

    Ok(object_storage.list_buckets().map_err(CommandError::from)?.len())
}
