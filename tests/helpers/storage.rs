use gcp_automation::object_storage::errors::ObjectStorageError;
use gcp_automation::object_storage::{Bucket, BucketDeleteStrategy, BucketObject, ObjectStorage};
use gcp_automation::services::gcp::object_storage_regions::GcpStorageRegion;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

#[derive(Default)]
struct StoredBucket {
    labels: Option<HashMap<String, String>>,
    objects: BTreeMap<String, Vec<u8>>,
}

/// Object storage kept in memory, some buckets can be made impossible to delete.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    buckets: Mutex<BTreeMap<String, StoredBucket>>,
    undeletable_buckets: Vec<String>,
    names_taken_elsewhere: bool,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket_name: &str) -> Self {
        self.buckets
            .lock()
            .unwrap()
            .insert(bucket_name.to_string(), StoredBucket::default());
        self
    }

    pub fn with_undeletable_bucket(mut self, bucket_name: &str) -> Self {
        self.undeletable_buckets.push(bucket_name.to_string());
        self.with_bucket(bucket_name)
    }

    /// Every create call conflicts, as if another project owned the name.
    pub fn with_names_taken_elsewhere(mut self) -> Self {
        self.names_taken_elsewhere = true;
        self
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets.lock().unwrap().keys().cloned().collect()
    }

    pub fn labels(&self, bucket_name: &str) -> Option<HashMap<String, String>> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket_name)
            .and_then(|b| b.labels.clone())
    }

    pub fn object(&self, bucket_name: &str, object_key: &str) -> Option<Vec<u8>> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket_name)
            .and_then(|b| b.objects.get(object_key).cloned())
    }
}

impl ObjectStorage for InMemoryObjectStorage {
    fn id(&self) -> &str {
        "in-memory"
    }

    fn name(&self) -> &str {
        "In memory storage"
    }

    fn list_buckets(&self) -> Result<Vec<String>, ObjectStorageError> {
        Ok(self.bucket_names())
    }

    fn bucket_exists(&self, bucket_name: &str) -> bool {
        self.buckets.lock().unwrap().contains_key(bucket_name)
    }

    fn create_bucket(
        &self,
        bucket_name: &str,
        bucket_labels: Option<HashMap<String, String>>,
    ) -> Result<Bucket, ObjectStorageError> {
        let mut buckets = self.buckets.lock().unwrap();
        if self.names_taken_elsewhere || buckets.contains_key(bucket_name) {
            return Err(ObjectStorageError::BucketAlreadyExists {
                bucket_name: bucket_name.to_string(),
                raw_error_message: "409 Conflict".to_string(),
            });
        }
        buckets.insert(
            bucket_name.to_string(),
            StoredBucket {
                labels: bucket_labels.clone(),
                ..Default::default()
            },
        );

        Ok(Bucket::new(bucket_name.to_string(), GcpStorageRegion::Us, bucket_labels))
    }

    fn get_bucket(&self, bucket_name: &str) -> Result<Bucket, ObjectStorageError> {
        match self.buckets.lock().unwrap().get(bucket_name) {
            Some(bucket) => Ok(Bucket::new(bucket_name.to_string(), GcpStorageRegion::Us, bucket.labels.clone())),
            None => Err(ObjectStorageError::CannotGetBucket {
                bucket_name: bucket_name.to_string(),
                raw_error_message: "404 bucket not found".to_string(),
            }),
        }
    }

    fn delete_bucket(
        &self,
        bucket_name: &str,
        bucket_delete_strategy: BucketDeleteStrategy,
    ) -> Result<(), ObjectStorageError> {
        if self.undeletable_buckets.iter().any(|b| b == bucket_name) {
            return Err(ObjectStorageError::CannotDeleteBucket {
                bucket_name: bucket_name.to_string(),
                raw_error_message: "403 permission denied".to_string(),
            });
        }

        let mut buckets = self.buckets.lock().unwrap();
        match bucket_delete_strategy {
            BucketDeleteStrategy::HardDelete => {
                buckets.remove(bucket_name);
            }
            BucketDeleteStrategy::Empty => {
                if let Some(bucket) = buckets.get_mut(bucket_name) {
                    bucket.objects.clear();
                }
            }
        }
        Ok(())
    }

    fn put_object(
        &self,
        bucket_name: &str,
        object_key: &str,
        file_path: &Path,
    ) -> Result<BucketObject, ObjectStorageError> {
        let upload_error = |raw_error_message: String| ObjectStorageError::CannotUploadFile {
            bucket_name: bucket_name.to_string(),
            file_name: object_key.to_string(),
            raw_error_message,
        };

        let content = std::fs::read(file_path).map_err(|e| upload_error(e.to_string()))?;
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(bucket_name)
            .ok_or_else(|| upload_error("404 bucket not found".to_string()))?;
        let size = content.len();
        bucket.objects.insert(object_key.to_string(), content);

        Ok(BucketObject {
            bucket_name: bucket_name.to_string(),
            key: object_key.to_string(),
            size,
        })
    }

    fn list_objects(&self, bucket_name: &str, prefix: Option<&str>) -> Result<Vec<String>, ObjectStorageError> {
        match self.buckets.lock().unwrap().get(bucket_name) {
            Some(bucket) => Ok(bucket
                .objects
                .keys()
                .filter(|k| prefix.is_none_or(|p| k.starts_with(p)))
                .cloned()
                .collect()),
            None => Err(ObjectStorageError::CannotListObjects {
                bucket_name: bucket_name.to_string(),
                raw_error_message: "404 bucket not found".to_string(),
            }),
        }
    }
}
