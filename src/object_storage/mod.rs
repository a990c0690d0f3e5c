use crate::object_storage::errors::ObjectStorageError;
use crate::services::gcp::object_storage_regions::GcpStorageRegion;
use std::collections::HashMap;
use std::path::Path;

pub mod errors;
pub mod google_object_storage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BucketDeleteStrategy {
    /// Delete all objects, then the bucket itself.
    HardDelete,
    /// Delete all objects, keep the bucket.
    Empty,
}

pub trait ObjectStorage {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn list_buckets(&self) -> Result<Vec<String>, ObjectStorageError>;
    fn bucket_exists(&self, bucket_name: &str) -> bool;
    fn create_bucket(
        &self,
        bucket_name: &str,
        bucket_labels: Option<HashMap<String, String>>,
    ) -> Result<Bucket, ObjectStorageError>;
    fn get_bucket(&self, bucket_name: &str) -> Result<Bucket, ObjectStorageError>;
    fn delete_bucket(
        &self,
        bucket_name: &str,
        bucket_delete_strategy: BucketDeleteStrategy,
    ) -> Result<(), ObjectStorageError>;
    fn put_object(&self, bucket_name: &str, object_key: &str, file_path: &Path)
    -> Result<BucketObject, ObjectStorageError>;
    fn list_objects(&self, bucket_name: &str, prefix: Option<&str>) -> Result<Vec<String>, ObjectStorageError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub location: GcpStorageRegion,
    pub labels: Option<HashMap<String, String>>,
}

impl Bucket {
    pub fn new(name: String, location: GcpStorageRegion, labels: Option<HashMap<String, String>>) -> Self {
        Self { name, location, labels }
    }

    /// `gs://` url of an object stored in this bucket.
    pub fn object_url(&self, object_key: &str) -> String {
        format!("gs://{}/{}", self.name, object_key)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BucketObject {
    pub bucket_name: String,
    pub key: String,
    pub size: usize,
}

/// Guess a content type from the file extension, uploads default to binary.
pub fn content_type_for(file_path: &Path) -> &'static str {
    match file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("png") => "image/png",
        Some("json") => "application/json",
        Some("txt") | Some("log") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
