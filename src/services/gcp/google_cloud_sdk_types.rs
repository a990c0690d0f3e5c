use crate::models::gcp::{CredentialsError, JsonCredentials};
use crate::object_storage::Bucket;
use crate::runtime::block_on;
use crate::services::gcp::object_storage_regions::GcpStorageRegion;
use google_cloud_storage::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_storage::http::buckets::Bucket as GcpBucket;
use std::str::FromStr;

/// Handle conversion and deal with external types for Google cloud
/// defined here https://github.com/yoshidan/google-cloud-rust
/// Keeping it isolated prevent from high coupling with third party crate

pub fn new_gcp_credentials_file_from_credentials(
    credentials: &JsonCredentials,
) -> Result<CredentialsFile, CredentialsError> {
    block_on(CredentialsFile::new_from_str(credentials.to_json_string()?.as_str())).map_err(|e| {
        CredentialsError::CannotCreateCredentials {
            raw_error_message: e.to_string(),
        }
    })
}

impl TryFrom<GcpBucket> for Bucket {
    type Error = String;

    fn try_from(value: GcpBucket) -> Result<Self, Self::Error> {
        Ok(Bucket {
            name: value.name,
            location: GcpStorageRegion::from_str(value.location.as_str())?,
            labels: value.labels,
        })
    }
}
