use crate::cmd::gcloud::Gcloud;
use crate::models::gcp::CredentialsFile;
use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum AuthServiceError {
    #[error("Cannot activate service account `{service_account_email}`, error: `{raw_error_message}`")]
    CannotActivateServiceAccount {
        service_account_email: String,
        raw_error_message: String,
    },
    #[error("Cannot get an access token, error: `{raw_error_message}`")]
    CannotGetAccessToken { raw_error_message: String },
}

pub struct GoogleAuthService {}

impl GoogleAuthService {
    /// Makes the service account the active `gcloud` account, following `gcloud` calls run as it.
    pub fn activate_service_account(gcloud: &Gcloud, credentials_file: &CredentialsFile) -> Result<(), AuthServiceError> {
        let service_account_email = credentials_file.credentials().client_email.as_str();
        let key_file = format!("--key-file={}", credentials_file.path().to_string_lossy());

        gcloud
            .exec(&["auth", "activate-service-account", service_account_email, key_file.as_str()])
            .map(|_| ())
            .map_err(|e| AuthServiceError::CannotActivateServiceAccount {
                service_account_email: service_account_email.to_string(),
                raw_error_message: e.raw_error_message().to_string(),
            })
    }

    /// Short lived OAuth2 token of the active account.
    pub fn print_access_token(gcloud: &Gcloud) -> Result<String, AuthServiceError> {
        let output = gcloud
            .exec(&["auth", "print-access-token"])
            .map_err(|e| AuthServiceError::CannotGetAccessToken {
                raw_error_message: e.raw_error_message().to_string(),
            })?;

        match output.iter().map(|line| line.trim()).find(|line| !line.is_empty()) {
            Some(token) => Ok(token.to_string()),
            None => Err(AuthServiceError::CannotGetAccessToken {
                raw_error_message: "gcloud returned an empty access token".to_string(),
            }),
        }
    }
}
