use crate::object_storage::errors::ObjectStorageError;
use crate::object_storage::{Bucket, BucketDeleteStrategy, BucketObject, ObjectStorage, content_type_for};
use crate::services::gcp::object_storage_regions::GcpStorageRegion;
use crate::services::gcp::object_storage_service::{ObjectStorageService, ObjectStorageServiceError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub struct GoogleOS {
    id: String,
    name: String,
    project_id: String,
    region: GcpStorageRegion,
    service: Arc<ObjectStorageService>,
}

impl GoogleOS {
    pub fn new(
        id: &str,
        name: &str,
        project_id: &str,
        region: GcpStorageRegion,
        service: Arc<ObjectStorageService>,
    ) -> GoogleOS {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            project_id: project_id.to_string(),
            region,
            service,
        }
    }
}

/// Cloud Storage naming rules: 3 to 63 chars, lowercase letters, digits, `-`, `_` and `.`,
/// starting and ending with a letter or a digit, never prefixed by `goog`.
pub fn validate_bucket_name(bucket_name: &str) -> Result<(), String> {
    if !(3..=63).contains(&bucket_name.len()) {
        return Err("bucket name must contain 3 to 63 characters".to_string());
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' || c == '.')
    {
        return Err("bucket name can only contain lowercase letters, digits, `-`, `_` and `.`".to_string());
    }

    let is_alphanumeric = |c: Option<char>| c.map(|c| c.is_ascii_alphanumeric()).unwrap_or(false);
    if !is_alphanumeric(bucket_name.chars().next()) || !is_alphanumeric(bucket_name.chars().last()) {
        return Err("bucket name must start and end with a letter or a digit".to_string());
    }

    if bucket_name.starts_with("goog") {
        return Err("bucket name cannot begin with the `goog` prefix".to_string());
    }

    Ok(())
}

impl ObjectStorage for GoogleOS {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn list_buckets(&self) -> Result<Vec<String>, ObjectStorageError> {
        self.service
            .list_buckets_names(self.project_id.as_str(), None)
            .map_err(|e| ObjectStorageError::CannotListBuckets {
                raw_error_message: e.get_raw_error_message(),
            })
    }

    fn bucket_exists(&self, bucket_name: &str) -> bool {
        self.service.bucket_exists(bucket_name)
    }

    fn create_bucket(
        &self,
        bucket_name: &str,
        bucket_labels: Option<HashMap<String, String>>,
    ) -> Result<Bucket, ObjectStorageError> {
        validate_bucket_name(bucket_name).map_err(|e| ObjectStorageError::InvalidBucketName {
            bucket_name: bucket_name.to_string(),
            raw_error_message: e,
        })?;

        // a bucket not created here must never be handed back as created
        if self.service.bucket_exists(bucket_name) {
            return Err(ObjectStorageError::BucketAlreadyExists {
                bucket_name: bucket_name.to_string(),
                raw_error_message: "bucket name is already taken".to_string(),
            });
        }

        self.service
            .create_bucket(self.project_id.as_str(), bucket_name, self.region, bucket_labels)
            .map_err(|e| match e {
                ObjectStorageServiceError::BucketAlreadyExists { raw_error_message, .. } => {
                    ObjectStorageError::BucketAlreadyExists {
                        bucket_name: bucket_name.to_string(),
                        raw_error_message,
                    }
                }
                e => ObjectStorageError::CannotCreateBucket {
                    bucket_name: bucket_name.to_string(),
                    raw_error_message: e.get_raw_error_message(),
                },
            })
    }

    fn get_bucket(&self, bucket_name: &str) -> Result<Bucket, ObjectStorageError> {
        self.service
            .get_bucket(bucket_name)
            .map_err(|e| ObjectStorageError::CannotGetBucket {
                bucket_name: bucket_name.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })
    }

    fn delete_bucket(
        &self,
        bucket_name: &str,
        bucket_delete_strategy: BucketDeleteStrategy,
    ) -> Result<(), ObjectStorageError> {
        match bucket_delete_strategy {
            BucketDeleteStrategy::HardDelete => {
                self.service
                    .delete_bucket(bucket_name, true)
                    .map_err(|e| ObjectStorageError::CannotDeleteBucket {
                        bucket_name: bucket_name.to_string(),
                        raw_error_message: e.get_raw_error_message(),
                    })
            }
            BucketDeleteStrategy::Empty => {
                self.service
                    .empty_bucket(bucket_name)
                    .map_err(|e| ObjectStorageError::CannotEmptyBucket {
                        bucket_name: bucket_name.to_string(),
                        raw_error_message: e.get_raw_error_message(),
                    })
            }
        }
    }

    fn put_object(
        &self,
        bucket_name: &str,
        object_key: &str,
        file_path: &Path,
    ) -> Result<BucketObject, ObjectStorageError> {
        let file_content = std::fs::read(file_path).map_err(|e| ObjectStorageError::CannotUploadFile {
            bucket_name: bucket_name.to_string(),
            file_name: object_key.to_string(),
            raw_error_message: e.to_string(),
        })?;

        self.service
            .put_object(
                bucket_name,
                object_key,
                file_content,
                Some(content_type_for(file_path).to_string()),
            )
            .map_err(|e| ObjectStorageError::CannotUploadFile {
                bucket_name: bucket_name.to_string(),
                file_name: object_key.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })
    }

    fn list_objects(&self, bucket_name: &str, prefix: Option<&str>) -> Result<Vec<String>, ObjectStorageError> {
        self.service
            .list_objects_keys_only(bucket_name, prefix)
            .map_err(|e| ObjectStorageError::CannotListObjects {
                bucket_name: bucket_name.to_string(),
                raw_error_message: e.get_raw_error_message(),
            })
    }
}
