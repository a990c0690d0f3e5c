use crate::models::ToCloudProviderFormat;
use crate::models::gcp::JsonCredentials;
use crate::object_storage::{Bucket, BucketObject};
use crate::runtime::block_on;
use crate::services::gcp::google_cloud_sdk_types::new_gcp_credentials_file_from_credentials;
use crate::services::gcp::object_storage_regions::GcpStorageRegion;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::buckets::Bucket as GcpBucket;
use google_cloud_storage::http::buckets::delete::DeleteBucketRequest;
use google_cloud_storage::http::buckets::get::GetBucketRequest;
use google_cloud_storage::http::buckets::insert::{BucketCreationConfig, InsertBucketParam, InsertBucketRequest};
use google_cloud_storage::http::buckets::list::ListBucketsRequest;
use google_cloud_storage::http::objects::Object as GcpObject;
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use google_cloud_storage::http::Error as HttpError;
use google_cloud_storage::http::objects::upload::{UploadObjectRequest, UploadType};
use reqwest::Body;
use std::collections::HashMap;
use thiserror::Error;

const HTTP_FORBIDDEN: u16 = 403;
const HTTP_CONFLICT: u16 = 409;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum ObjectStorageServiceError {
    #[error("Cannot create object storage service: {raw_error_message:?}")]
    CannotCreateService { raw_error_message: String },
    #[error("Bucket `{bucket_name}` already exists: {raw_error_message:?}")]
    BucketAlreadyExists {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot create bucket `{bucket_name}`: {raw_error_message:?}")]
    CannotCreateBucket {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot get bucket `{bucket_name}`: {raw_error_message:?}")]
    CannotGetBucket {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete bucket `{bucket_name}`: {raw_error_message:?}")]
    CannotDeleteBucket {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete object `{object_id}` from bucket `{bucket_name}`: {raw_error_message:?}")]
    CannotDeleteObject {
        bucket_name: String,
        object_id: String,
        raw_error_message: String,
    },
    #[error("Cannot list buckets: {raw_error_message:?}")]
    CannotListBuckets { raw_error_message: String },
    #[error("Cannot list objects from bucket `{bucket_name}`: {raw_error_message:?}")]
    CannotListObjects {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot put object `{object_key}` to bucket `{bucket_name}`: {raw_error_message:?}")]
    CannotPutObjectToBucket {
        object_key: String,
        bucket_name: String,
        raw_error_message: String,
    },
}

impl ObjectStorageServiceError {
    pub fn get_raw_error_message(self) -> String {
        match self {
            ObjectStorageServiceError::CannotCreateService { raw_error_message } => raw_error_message,
            ObjectStorageServiceError::BucketAlreadyExists { raw_error_message, .. } => raw_error_message,
            ObjectStorageServiceError::CannotCreateBucket { raw_error_message, .. } => raw_error_message,
            ObjectStorageServiceError::CannotGetBucket { raw_error_message, .. } => raw_error_message,
            ObjectStorageServiceError::CannotDeleteBucket { raw_error_message, .. } => raw_error_message,
            ObjectStorageServiceError::CannotDeleteObject { raw_error_message, .. } => raw_error_message,
            ObjectStorageServiceError::CannotListBuckets { raw_error_message } => raw_error_message,
            ObjectStorageServiceError::CannotListObjects { raw_error_message, .. } => raw_error_message,
            ObjectStorageServiceError::CannotPutObjectToBucket { raw_error_message, .. } => raw_error_message,
        }
    }
}

/// Google Cloud Storage JSON API access, all calls are blocking.
#[cfg_attr(test, faux::create)]
pub struct ObjectStorageService {
    client: Client,
}

#[cfg_attr(test, faux::methods)]
impl ObjectStorageService {
    pub fn new(google_credentials: &JsonCredentials) -> Result<Self, ObjectStorageServiceError> {
        Ok(Self {
            client: Client::new(
                block_on(ClientConfig::default().with_credentials(
                    new_gcp_credentials_file_from_credentials(google_credentials).map_err(|e| {
                        ObjectStorageServiceError::CannotCreateService {
                            raw_error_message: e.to_string(),
                        }
                    })?,
                ))
                .map_err(|e| ObjectStorageServiceError::CannotCreateService {
                    raw_error_message: e.to_string(),
                })?,
            ),
        })
    }

    /// Bucket names are global: a bucket owned by another project answers 403 and still exists.
    pub fn bucket_exists(&self, bucket_name: &str) -> bool {
        match block_on(self.client.get_bucket(&get_bucket_request(bucket_name))) {
            Ok(_) => true,
            Err(HttpError::Response(response)) => response.code == HTTP_FORBIDDEN,
            Err(_) => false,
        }
    }

    pub fn get_bucket(&self, bucket_name: &str) -> Result<Bucket, ObjectStorageServiceError> {
        let gcp_bucket: GcpBucket = block_on(self.client.get_bucket(&get_bucket_request(bucket_name)))
        .map_err(|e| ObjectStorageServiceError::CannotGetBucket {
            bucket_name: bucket_name.to_string(),
            raw_error_message: e.to_string(),
        })?;

        Bucket::try_from(gcp_bucket).map_err(|e| ObjectStorageServiceError::CannotGetBucket {
            bucket_name: bucket_name.to_string(),
            raw_error_message: e,
        })
    }

    pub fn create_bucket(
        &self,
        project_id: &str,
        bucket_name: &str,
        bucket_location: GcpStorageRegion,
        bucket_labels: Option<HashMap<String, String>>,
    ) -> Result<Bucket, ObjectStorageServiceError> {
        let create_bucket_request = InsertBucketRequest {
            name: bucket_name.to_string(),
            param: InsertBucketParam {
                project: project_id.to_string(),
                ..Default::default()
            },
            bucket: BucketCreationConfig {
                labels: bucket_labels,
                location: bucket_location.to_cloud_provider_format().to_uppercase(),
                ..Default::default()
            },
        };

        match block_on(self.client.insert_bucket(&create_bucket_request)) {
            Ok(created_bucket) => {
                Bucket::try_from(created_bucket).map_err(|e| ObjectStorageServiceError::CannotCreateBucket {
                    bucket_name: bucket_name.to_string(),
                    raw_error_message: e,
                })
            }
            Err(HttpError::Response(response)) if response.code == HTTP_CONFLICT => {
                Err(ObjectStorageServiceError::BucketAlreadyExists {
                    bucket_name: bucket_name.to_string(),
                    raw_error_message: response.to_string(),
                })
            }
            Err(e) => Err(ObjectStorageServiceError::CannotCreateBucket {
                bucket_name: bucket_name.to_string(),
                raw_error_message: e.to_string(),
            }),
        }
    }

    pub fn delete_bucket(&self, bucket_name: &str, force_delete_objects: bool) -> Result<(), ObjectStorageServiceError> {
        if force_delete_objects {
            self.empty_bucket(bucket_name)?;
        }

        block_on(self.client.delete_bucket(&DeleteBucketRequest {
            bucket: bucket_name.to_string(),
            param: Default::default(),
        }))
        .map_err(|e| ObjectStorageServiceError::CannotDeleteBucket {
            bucket_name: bucket_name.to_string(),
            raw_error_message: e.to_string(),
        })
    }

    pub fn delete_object(&self, bucket_name: &str, object_id: &str) -> Result<(), ObjectStorageServiceError> {
        block_on(self.client.delete_object(&DeleteObjectRequest {
            bucket: bucket_name.to_string(),
            object: object_id.to_string(),
            ..Default::default()
        }))
        .map_err(|e| ObjectStorageServiceError::CannotDeleteObject {
            bucket_name: bucket_name.to_string(),
            object_id: object_id.to_string(),
            raw_error_message: e.to_string(),
        })
    }

    pub fn empty_bucket(&self, bucket_name: &str) -> Result<(), ObjectStorageServiceError> {
        for object_key in self.list_objects_keys_only(bucket_name, None)? {
            self.delete_object(bucket_name, object_key.as_str())?;
        }

        Ok(())
    }

    /// Names of the project's buckets.
    /// Names only, so buckets in locations this tool doesn't manage never break the listing.
    pub fn list_buckets_names(
        &self,
        project_id: &str,
        bucket_name_prefix: Option<&str>,
    ) -> Result<Vec<String>, ObjectStorageServiceError> {
        let mut buckets: Vec<String> = vec![];
        let mut next_page_token: Option<String> = None;

        loop {
            match block_on(self.client.list_buckets(&ListBucketsRequest {
                project: project_id.to_string(),
                page_token: next_page_token,
                prefix: bucket_name_prefix.map(str::to_string),
                max_results: Some(1000),
                ..Default::default()
            })) {
                Ok(buckets_list_response) => {
                    next_page_token = buckets_list_response.next_page_token;
                    buckets.extend(buckets_list_response.items.into_iter().map(|b| b.name));

                    if next_page_token.is_none() {
                        break;
                    }
                }
                Err(e) => {
                    return Err(ObjectStorageServiceError::CannotListBuckets {
                        raw_error_message: e.to_string(),
                    });
                }
            }
        }

        Ok(buckets)
    }

    pub fn put_object(
        &self,
        bucket_name: &str,
        object_key: &str,
        content: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<BucketObject, ObjectStorageServiceError> {
        let content_length = content.len();
        match block_on(self.client.upload_object(
            &UploadObjectRequest {
                bucket: bucket_name.to_string(),
                ..Default::default()
            },
            Body::from(content),
            &UploadType::Multipart(Box::new(GcpObject {
                name: object_key.to_string(),
                content_type,
                ..Default::default()
            })),
        )) {
            Ok(o) => Ok(BucketObject {
                bucket_name: o.bucket,
                key: o.name,
                size: content_length,
            }),
            Err(e) => Err(ObjectStorageServiceError::CannotPutObjectToBucket {
                bucket_name: bucket_name.to_string(),
                object_key: object_key.to_string(),
                raw_error_message: e.to_string(),
            }),
        }
    }

    pub fn list_objects_keys_only(
        &self,
        bucket_name: &str,
        object_id_prefix: Option<&str>,
    ) -> Result<Vec<String>, ObjectStorageServiceError> {
        let mut objects: Vec<String> = vec![];
        let mut next_page_token: Option<String> = None;

        loop {
            match block_on(self.client.list_objects(&ListObjectsRequest {
                page_token: next_page_token,
                bucket: bucket_name.to_string(),
                prefix: object_id_prefix.map(str::to_string),
                max_results: Some(1000),
                ..Default::default()
            })) {
                Ok(objects_list_response) => {
                    next_page_token = objects_list_response.next_page_token;
                    if let Some(new_objects) = objects_list_response.items {
                        objects.extend(new_objects.iter().map(|o| o.name.to_string()));
                    }

                    if next_page_token.is_none() {
                        break;
                    }
                }
                Err(e) => {
                    return Err(ObjectStorageServiceError::CannotListObjects {
                        bucket_name: bucket_name.to_string(),
                        raw_error_message: e.to_string(),
                    });
                }
            }
        }

        Ok(objects)
    }
}

fn get_bucket_request(bucket_name: &str) -> GetBucketRequest {
    GetBucketRequest {
        bucket: bucket_name.to_string(),
        if_metageneration_match: None,
        if_metageneration_not_match: None,
        projection: None,
    }
}
