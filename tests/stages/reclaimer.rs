use crate::helpers::credentials::{PROJECT_ID, event_details, logger};
use crate::helpers::deployment::{FakeDeploymentTarget, FakeFailure, REPOSITORY_NAME};
use crate::helpers::storage::InMemoryObjectStorage;
use gcp_automation::errors::Tag;
use gcp_automation::models::gcp::regions::GcpRegion;
use gcp_automation::reclaimer::Reclaimer;
use gcp_automation::resource_log::{ResourceLog, TrackedService};
use std::path::Path;
use url::Url;

const BUCKET_NAME: &str = "automation-bucket-a1b2c3d4";
const IMAGE: &str = "us-central1-docker.pkg.dev/automation-project/automation/automation-demo:a1b2c3d4";
const SERVICE_NAME: &str = "automation-service-a1b2c3d4";

fn fake_target() -> FakeDeploymentTarget {
    FakeDeploymentTarget::new(&Url::parse("https://automation-service-a1b2c3d4-uc.a.run.app").expect("valid url"))
}

fn write_full_log(path: &Path) {
    let mut log = ResourceLog::new(path, PROJECT_ID);
    log.track_bucket(BUCKET_NAME).expect("cannot track bucket");
    log.track_repository(REPOSITORY_NAME, GcpRegion::UsCentral1)
        .expect("cannot track repository");
    log.track_image(IMAGE).expect("cannot track image");
    log.track_service(TrackedService {
        name: SERVICE_NAME.to_string(),
        region: GcpRegion::UsCentral1,
        url: Some("https://automation-service-a1b2c3d4-uc.a.run.app".to_string()),
    })
    .expect("cannot track service");
}

#[test]
fn test_reclaim_without_resource_log() {
    // setup:
    let dir = tempfile::tempdir().expect("cannot create temp dir");
    let storage = InMemoryObjectStorage::new().with_bucket("not-ours");
    let target = fake_target();

    // execute:
    let outcome = Reclaimer::new(&storage, &target, &dir.path().join("resources.json"), logger(), &event_details())
        .reclaim()
        .expect("nothing to delete is fine");

    // verify:
    assert!(outcome.deleted.is_empty());
    assert!(target.calls().is_empty());
    assert_eq!(storage.bucket_names(), vec!["not-ours".to_string()]);
}

#[test]
fn test_reclaim_everything() {
    // setup:
    let dir = tempfile::tempdir().expect("cannot create temp dir");
    let log_path = dir.path().join("resources.json");
    write_full_log(&log_path);
    let storage = InMemoryObjectStorage::new().with_bucket(BUCKET_NAME).with_bucket("not-ours");
    let target = fake_target();

    // execute:
    let outcome = Reclaimer::new(&storage, &target, &log_path, logger(), &event_details())
        .reclaim()
        .expect("everything should be deleted");

    // verify:
    assert_eq!(
        target.calls(),
        vec![
            format!("delete_service:{SERVICE_NAME}"),
            format!("delete_image:{IMAGE}"),
            format!("delete_repository:{REPOSITORY_NAME}"),
        ]
    );
    assert_eq!(outcome.deleted.len(), 4);
    assert_eq!(outcome.deleted[3], format!("bucket `{BUCKET_NAME}`"));
    assert_eq!(storage.bucket_names(), vec!["not-ours".to_string()]);
    assert!(!log_path.exists());
}

#[test]
fn test_partial_reclaim_keeps_failed_resources() {
    // setup:
    let dir = tempfile::tempdir().expect("cannot create temp dir");
    let log_path = dir.path().join("resources.json");
    write_full_log(&log_path);
    let storage = InMemoryObjectStorage::new().with_undeletable_bucket(BUCKET_NAME);
    let target = fake_target().failing_on(FakeFailure::DeleteImage);

    // execute:
    let err = Reclaimer::new(&storage, &target, &log_path, logger(), &event_details())
        .reclaim()
        .expect_err("failed deletions must be reported");

    // verify: deletion went on after the first failure
    assert_eq!(err.tag(), &Tag::ReclaimIncomplete);
    assert_eq!(target.calls().len(), 3);
    assert!(err.user_log_message().contains(IMAGE));
    assert!(err.user_log_message().contains(BUCKET_NAME));

    let remaining = ResourceLog::load(&log_path)
        .expect("log readable")
        .expect("log kept");
    assert_eq!(remaining.resources().images, vec![IMAGE.to_string()]);
    assert_eq!(remaining.resources().buckets, vec![BUCKET_NAME.to_string()]);
    assert!(remaining.resources().services.is_empty());
    assert!(remaining.resources().repositories.is_empty());
    assert_eq!(remaining.resources().project_id.as_deref(), Some(PROJECT_ID));

    // execute: a second run only retries what is left
    let target = fake_target();
    let err = Reclaimer::new(&storage, &target, &log_path, logger(), &event_details())
        .reclaim()
        .expect_err("bucket is still undeletable");

    // verify:
    assert_eq!(err.tag(), &Tag::ReclaimIncomplete);
    assert_eq!(target.calls(), vec![format!("delete_image:{IMAGE}")]);
    let remaining = ResourceLog::load(&log_path)
        .expect("log readable")
        .expect("log kept");
    assert!(remaining.resources().images.is_empty());
    assert_eq!(remaining.resources().buckets, vec![BUCKET_NAME.to_string()]);
}

#[test]
fn test_reclaim_invalid_resource_log() {
    let dir = tempfile::tempdir().expect("cannot create temp dir");
    let log_path = dir.path().join("resources.json");
    std::fs::write(&log_path, "{ not json").expect("cannot write");
    let storage = InMemoryObjectStorage::new();
    let target = fake_target();

    let err = Reclaimer::new(&storage, &target, &log_path, logger(), &event_details())
        .reclaim()
        .expect_err("an invalid log must not be guessed");

    assert_eq!(err.tag(), &Tag::CannotReadResourceLog);
    assert!(target.calls().is_empty());
    assert!(log_path.exists());
}

#[test]
fn test_reclaim_refuses_log_of_another_project() {
    // setup:
    let dir = tempfile::tempdir().expect("cannot create temp dir");
    let log_path = dir.path().join("resources.json");
    let mut log = ResourceLog::new(&log_path, "another-project");
    log.track_bucket(BUCKET_NAME).expect("cannot track bucket");
    let storage = InMemoryObjectStorage::new().with_bucket(BUCKET_NAME);
    let target = fake_target();

    // execute:
    let err = Reclaimer::new(&storage, &target, &log_path, logger(), &event_details())
        .reclaim()
        .expect_err("log belongs to another project");

    // verify:
    assert_eq!(err.tag(), &Tag::ResourceLogProjectMismatch);
    assert!(err.user_log_message().contains("another-project"));
    assert!(target.calls().is_empty());
    assert_eq!(storage.bucket_names(), vec![BUCKET_NAME.to_string()]);
    let log = ResourceLog::load(&log_path)
        .expect("log should load")
        .expect("log should still exist");
    assert_eq!(log.resources().descriptions(), vec![format!("bucket `{BUCKET_NAME}`")]);
}
