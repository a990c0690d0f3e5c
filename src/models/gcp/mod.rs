pub mod io;
pub mod regions;

use crate::models::gcp::io::JsonCredentials as IOJsonCredentials;
use derivative::Derivative;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Service account JSON not found: `{path}`.")]
    FileNotFound { path: String },
    #[error("Cannot read service account JSON `{path}`: {raw_error_message:?}.")]
    CannotReadFile { path: String, raw_error_message: String },
    #[error("Service account JSON is not valid: {raw_error_message:?}.")]
    InvalidJson { raw_error_message: String },
    #[error("Service account field `{field}` is not valid: {raw_error_message:?}.")]
    InvalidField { field: String, raw_error_message: String },
    #[error("Cannot create credentials: {raw_error_message:?}.")]
    CannotCreateCredentials { raw_error_message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonCredentialsType {
    ServiceAccount,
}

impl Display for JsonCredentialsType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JsonCredentialsType::ServiceAccount => "service_account",
        })
    }
}

/// Google service account key.
/// `private_key` is kept out of `Debug` output.
#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Debug)]
pub struct JsonCredentials {
    pub r#type: JsonCredentialsType,
    pub client_email: String,
    pub client_id: String,
    pub private_key_id: String,
    #[derivative(Debug = "ignore")]
    pub private_key: String,
    pub auth_uri: Url,
    pub token_uri: Url,
    pub auth_provider_x509_cert_url: Url,
    pub client_x509_cert_url: Url,
    pub project_id: String,
    pub universe_domain: String,
}

impl JsonCredentials {
    pub fn from_json_str(raw_json: &str) -> Result<Self, CredentialsError> {
        let io_credentials: IOJsonCredentials =
            serde_json::from_str(raw_json).map_err(|e| CredentialsError::InvalidJson {
                raw_error_message: e.to_string(),
            })?;

        let credentials = JsonCredentials::try_from(io_credentials)?;
        credentials.validate()?;

        Ok(credentials)
    }

    fn validate(&self) -> Result<(), CredentialsError> {
        for (field, value) in [
            ("client_email", &self.client_email),
            ("private_key", &self.private_key),
            ("project_id", &self.project_id),
        ] {
            if value.trim().is_empty() {
                return Err(CredentialsError::InvalidField {
                    field: field.to_string(),
                    raw_error_message: "value cannot be empty".to_string(),
                });
            }
        }

        if !self.client_email.contains('@') {
            return Err(CredentialsError::InvalidField {
                field: "client_email".to_string(),
                raw_error_message: format!("`{}` is not an email address", self.client_email),
            });
        }

        Ok(())
    }

    /// Serializes back to the key file format Google tooling expects.
    pub fn to_json_string(&self) -> Result<String, CredentialsError> {
        serde_json::to_string(&IOJsonCredentials::from(self.clone())).map_err(|e| {
            CredentialsError::CannotCreateCredentials {
                raw_error_message: e.to_string(),
            }
        })
    }
}

/// A service account key together with the file it has been read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsFile {
    path: PathBuf,
    credentials: JsonCredentials,
}

impl CredentialsFile {
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        if !path.is_file() {
            return Err(CredentialsError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let raw_json = std::fs::read_to_string(path).map_err(|e| CredentialsError::CannotReadFile {
            path: path.display().to_string(),
            raw_error_message: e.to_string(),
        })?;

        Ok(CredentialsFile {
            path: path.to_path_buf(),
            credentials: JsonCredentials::from_json_str(&raw_json)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn credentials(&self) -> &JsonCredentials {
        &self.credentials
    }
}
