use crate::helpers::gcp::GcpTestContext;
use function_name::named;
use gcp_automation::object_storage::google_object_storage::GoogleOS;
use gcp_automation::object_storage::{BucketDeleteStrategy, ObjectStorage};
use gcp_automation::services::gcp::object_storage_regions::GcpStorageRegion;
use gcp_automation::services::gcp::object_storage_service::ObjectStorageService;
use std::sync::Arc;
use uuid::Uuid;

fn google_os(context: &GcpTestContext) -> GoogleOS {
    let service = ObjectStorageService::new(context.credentials_file.credentials())
        .expect("Cannot initialize google object storage service");

    GoogleOS::new(
        "test",
        "Google Cloud Storage",
        &context.project_id,
        GcpStorageRegion::Us,
        Arc::new(service),
    )
}

#[named]
#[test]
fn test_bucket_lifecycle() {
    // setup:
    let context = GcpTestContext::from_env();
    let storage = google_os(&context);
    let bucket_name = format!("automation-test-{}", &Uuid::new_v4().simple().to_string()[..8]);
    let labels = hashmap! {
        "created_by".to_string() => "gcp-automation".to_string(),
        "test_name".to_string() => function_name!().to_string(),
    };

    // execute:
    let bucket = storage
        .create_bucket(&bucket_name, Some(labels))
        .expect("Cannot create bucket");
    // stick a guard on the bucket to delete it whatever the outcome
    let _bucket_guard = scopeguard::guard(&bucket_name, |bucket_name| {
        let _ = storage.delete_bucket(bucket_name, BucketDeleteStrategy::HardDelete);
    });

    // verify:
    assert_eq!(bucket.name, bucket_name);
    assert!(storage.bucket_exists(&bucket_name));
    assert!(storage.list_buckets().expect("Cannot list buckets").contains(&bucket_name));

    let dir = tempfile::tempdir().expect("cannot create temp dir");
    let report_path = dir.path().join("report.html");
    std::fs::write(&report_path, "<html>report</html>").expect("cannot write report");
    let object = storage
        .put_object(&bucket_name, "report.html", &report_path)
        .expect("Cannot upload report");
    assert_eq!(object.key, "report.html");
    assert_eq!(
        storage.list_objects(&bucket_name, None).expect("Cannot list objects"),
        vec!["report.html".to_string()]
    );

    // execute:
    storage
        .delete_bucket(&bucket_name, BucketDeleteStrategy::HardDelete)
        .expect("Cannot delete non empty bucket");

    // verify:
    assert!(!storage.bucket_exists(&bucket_name));
}

#[test]
fn test_delete_missing_bucket() {
    let context = GcpTestContext::from_env();
    let storage = google_os(&context);

    assert!(
        storage
            .delete_bucket(
                &format!("automation-missing-{}", Uuid::new_v4().simple()),
                BucketDeleteStrategy::HardDelete
            )
            .is_err()
    );
}
