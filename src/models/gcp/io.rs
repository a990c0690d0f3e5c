use crate::models::gcp::{CredentialsError, JsonCredentials as GcpJsonCredentials, JsonCredentialsType as GcpJsonCredentialsType};
use serde_derive::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum JsonCredentialsType {
    #[serde(rename = "service_account")]
    ServiceAccount,
}

impl From<JsonCredentialsType> for GcpJsonCredentialsType {
    fn from(value: JsonCredentialsType) -> Self {
        match value {
            JsonCredentialsType::ServiceAccount => GcpJsonCredentialsType::ServiceAccount,
        }
    }
}

impl From<GcpJsonCredentialsType> for JsonCredentialsType {
    fn from(value: GcpJsonCredentialsType) -> Self {
        match value {
            GcpJsonCredentialsType::ServiceAccount => JsonCredentialsType::ServiceAccount,
        }
    }
}

fn default_universe_domain() -> String {
    "googleapis.com".to_string()
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JsonCredentials {
    pub r#type: JsonCredentialsType,
    pub client_email: String,
    pub client_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_x509_cert_url: String,
    pub project_id: String,
    #[serde(default = "default_universe_domain")]
    pub universe_domain: String,
}

fn parse_url(field: &str, value: &str) -> Result<Url, CredentialsError> {
    Url::from_str(value).map_err(|e| CredentialsError::InvalidField {
        field: field.to_string(),
        raw_error_message: format!("Cannot parse `{value}` to URL: {e}"),
    })
}

impl TryFrom<JsonCredentials> for GcpJsonCredentials {
    type Error = CredentialsError;

    fn try_from(value: JsonCredentials) -> Result<Self, Self::Error> {
        Ok(GcpJsonCredentials {
            r#type: GcpJsonCredentialsType::from(value.r#type),
            client_email: value.client_email,
            client_id: value.client_id,
            private_key: value.private_key,
            private_key_id: value.private_key_id,
            auth_uri: parse_url("auth_uri", &value.auth_uri)?,
            token_uri: parse_url("token_uri", &value.token_uri)?,
            auth_provider_x509_cert_url: parse_url("auth_provider_x509_cert_url", &value.auth_provider_x509_cert_url)?,
            client_x509_cert_url: parse_url("client_x509_cert_url", &value.client_x509_cert_url)?,
            project_id: value.project_id,
            universe_domain: value.universe_domain,
        })
    }
}

impl From<GcpJsonCredentials> for JsonCredentials {
    fn from(value: GcpJsonCredentials) -> Self {
        JsonCredentials {
            r#type: JsonCredentialsType::from(value.r#type),
            client_email: value.client_email,
            client_id: value.client_id,
            private_key: value.private_key,
            private_key_id: value.private_key_id,
            auth_uri: value.auth_uri.to_string(),
            token_uri: value.token_uri.to_string(),
            auth_provider_x509_cert_url: value.auth_provider_x509_cert_url.to_string(),
            client_x509_cert_url: value.client_x509_cert_url.to_string(),
            project_id: value.project_id,
            universe_domain: value.universe_domain,
        }
    }
}
