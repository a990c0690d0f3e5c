use crate::helpers::credentials::{event_details, logger, validated_credentials};
use crate::helpers::deployment::{FakeDeploymentTarget, FakeFailure, REPOSITORY_NAME};
use crate::helpers::http::{StubBehavior, StubServer};
use crate::helpers::screenshot::RecordingScreenshotter;
use crate::helpers::storage::InMemoryObjectStorage;
use gcp_automation::errors::Tag;
use gcp_automation::initializer::ValidatedCredentials;
use gcp_automation::provisioner::{BUCKET_NAME_PREFIX, Provisioner, ProvisionerConfig};
use gcp_automation::reclaimer::Reclaimer;
use gcp_automation::resource_log::ResourceLog;
use gcp_automation::test_runner::{TestRunner, TestRunnerConfig};
use gcp_automation::uploader::Uploader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

const SERVICE_NAME: &str = "automation-service-a1b2c3d4";
const IMAGE: &str = "us-central1-docker.pkg.dev/automation-project/automation/automation-demo:a1b2c3d4";

struct Workspace {
    dir: TempDir,
    credentials: ValidatedCredentials,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("cannot create temp dir");
        let credentials = validated_credentials(dir.path());
        Workspace { dir, credentials }
    }

    fn resource_log_path(&self) -> PathBuf {
        self.dir.path().join("gcp_created_resources.json")
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    fn config(&self) -> ProvisionerConfig {
        ProvisionerConfig {
            resource_log_path: self.resource_log_path(),
            image_name: "automation-demo".to_string(),
            context_dir: self.dir.path().to_path_buf(),
            dockerfile: PathBuf::from("Dockerfile"),
            container_port: 8080,
            output_dir: self.output_dir(),
            request_timeout: Duration::from_secs(5),
            readiness_attempts: 2,
        }
    }

    fn resource_log(&self) -> ResourceLog {
        ResourceLog::load(&self.resource_log_path())
            .expect("log readable")
            .expect("log exists")
    }
}

fn unreachable_url() -> Url {
    Url::parse("http://127.0.0.1:9/").expect("valid url")
}

fn provisioner<'a>(
    workspace: &'a Workspace,
    storage: &'a InMemoryObjectStorage,
    target: &'a FakeDeploymentTarget,
) -> Provisioner<'a> {
    Provisioner::new(
        &workspace.credentials,
        storage,
        target,
        workspace.config(),
        logger(),
        &event_details(),
    )
}

fn test_runner(output_dir: &Path, screenshotter: &RecordingScreenshotter) -> TestRunner {
    TestRunner::new(
        TestRunnerConfig {
            output_dir: output_dir.to_path_buf(),
            request_timeout: Duration::from_secs(5),
            include_intentional_failure: true,
        },
        Some(Box::new(screenshotter.clone())),
        logger(),
        event_details(),
    )
}

#[test]
fn test_setup_then_reset() {
    // setup:
    let workspace = Workspace::new();
    let server = StubServer::start(StubBehavior::Healthy, SERVICE_NAME);
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(server.url());
    let screenshotter = RecordingScreenshotter::default();
    let runner = test_runner(&workspace.output_dir(), &screenshotter);
    let uploader = Uploader::new(&storage, logger(), &event_details());

    // execute:
    let outcome = provisioner(&workspace, &storage, &target)
        .setup(&runner, &uploader)
        .expect("setup should succeed");

    // verify: provisioned resources
    let bucket_name = outcome.provisioned.bucket_name.to_string();
    assert!(bucket_name.starts_with(BUCKET_NAME_PREFIX));
    assert_eq!(storage.bucket_names(), vec![bucket_name.to_string()]);
    let labels = storage.labels(&bucket_name).expect("bucket has labels");
    assert_eq!(labels.get("created_by").map(String::as_str), Some("gcp-automation"));
    assert!(labels.contains_key("creation_date"));
    assert_eq!(outcome.provisioned.image, IMAGE);
    assert_eq!(outcome.provisioned.service.name, SERVICE_NAME);
    assert_eq!(&outcome.provisioned.service_url, server.url());
    assert_eq!(
        target.calls(),
        vec![
            "ensure_repository".to_string(),
            format!("build_and_push_image:{IMAGE}"),
            format!("deploy_service:{SERVICE_NAME}"),
        ]
    );

    // verify: tests ran, the report and the only screenshot are uploaded
    assert_eq!(outcome.report.failed(), 1);
    assert_eq!(screenshotter.captured().len(), 1);
    let keys: Vec<&str> = outcome.uploaded.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["report.html", "screenshots/intentional_failure.png"]);
    assert!(storage.object(&bucket_name, "report.html").is_some());
    assert!(workspace.output_dir().join("report.html").is_file());

    // verify: everything created is tracked
    let log = workspace.resource_log();
    assert_eq!(log.resources().buckets, vec![bucket_name.to_string()]);
    assert_eq!(log.resources().repositories.len(), 1);
    assert_eq!(log.resources().images, vec![IMAGE.to_string()]);
    assert_eq!(log.resources().services.len(), 1);
    assert_eq!(
        log.resources().services[0].url.as_deref(),
        Some(server.url().as_str())
    );

    // execute: a second setup is refused
    let err = provisioner(&workspace, &storage, &target)
        .setup(&runner, &uploader)
        .expect_err("resources are still tracked");
    assert_eq!(err.tag(), &Tag::AlreadyProvisioned);

    // execute: reset deletes exactly what setup created
    let reclaim_target = FakeDeploymentTarget::new(server.url());
    Reclaimer::new(&storage, &reclaim_target, &workspace.resource_log_path(), logger(), &event_details())
        .reclaim()
        .expect("reset should succeed");

    // verify:
    assert_eq!(
        reclaim_target.calls(),
        vec![
            format!("delete_service:{SERVICE_NAME}"),
            format!("delete_image:{IMAGE}"),
            format!("delete_repository:{REPOSITORY_NAME}"),
        ]
    );
    assert!(storage.bucket_names().is_empty());
    assert!(!workspace.resource_log_path().exists());
}

#[test]
fn test_refuses_when_already_provisioned() {
    // setup:
    let workspace = Workspace::new();
    std::fs::write(
        workspace.resource_log_path(),
        r#"{"buckets": ["automation-bucket-0badcafe"]}"#,
    )
    .expect("cannot write log");
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(&unreachable_url());

    // execute:
    let err = provisioner(&workspace, &storage, &target)
        .provision()
        .expect_err("resources are still tracked");

    // verify: nothing touched
    assert_eq!(err.tag(), &Tag::AlreadyProvisioned);
    assert!(err.user_log_message().contains("automation-bucket-0badcafe"));
    assert!(err.hint_message().is_some());
    assert!(storage.bucket_names().is_empty());
    assert!(target.calls().is_empty());
    assert_eq!(
        workspace.resource_log().resources().buckets,
        vec!["automation-bucket-0badcafe".to_string()]
    );
}

#[test]
fn test_bucket_name_taken_elsewhere() {
    // setup:
    let workspace = Workspace::new();
    let storage = InMemoryObjectStorage::new().with_names_taken_elsewhere();
    let target = FakeDeploymentTarget::new(&unreachable_url());

    // execute:
    let err = provisioner(&workspace, &storage, &target)
        .provision()
        .expect_err("the bucket name is taken");

    // verify: the foreign bucket is never tracked
    assert_eq!(err.tag(), &Tag::BucketAlreadyExists);
    assert!(err.user_log_message().contains(BUCKET_NAME_PREFIX));
    assert!(storage.bucket_names().is_empty());
    assert!(target.calls().is_empty());
    assert!(
        ResourceLog::load(&workspace.resource_log_path())
            .expect("log readable")
            .is_none()
    );
}

#[test]
fn test_empty_resource_log_does_not_block() {
    let workspace = Workspace::new();
    std::fs::write(workspace.resource_log_path(), "{}").expect("cannot write log");
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(&unreachable_url());

    let provisioned = provisioner(&workspace, &storage, &target)
        .provision()
        .expect("an empty log tracks nothing");

    assert_eq!(workspace.resource_log().resources().buckets, vec![provisioned.bucket_name]);
}

#[test]
fn test_bucket_is_tracked_when_build_fails() {
    // setup:
    let workspace = Workspace::new();
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(&unreachable_url()).failing_on(FakeFailure::Build);

    // execute:
    let err = provisioner(&workspace, &storage, &target)
        .provision()
        .expect_err("build fails");

    // verify:
    assert_eq!(err.tag(), &Tag::CannotBuildImage);
    let log = workspace.resource_log();
    assert_eq!(log.resources().buckets, storage.bucket_names());
    assert_eq!(log.resources().repositories.len(), 1);
    assert!(log.resources().images.is_empty());
    assert!(log.resources().services.is_empty());
    assert!(!target.calls().iter().any(|c| c.starts_with("deploy_service")));
}

#[test]
fn test_push_failure() {
    let workspace = Workspace::new();
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(&unreachable_url()).failing_on(FakeFailure::Push);

    let err = provisioner(&workspace, &storage, &target)
        .provision()
        .expect_err("push fails");

    assert_eq!(err.tag(), &Tag::CannotPushImage);
    assert!(workspace.resource_log().resources().images.is_empty());
}

#[test]
fn test_repository_failure_keeps_bucket_tracked() {
    let workspace = Workspace::new();
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(&unreachable_url()).failing_on(FakeFailure::CreateRepository);

    let err = provisioner(&workspace, &storage, &target)
        .provision()
        .expect_err("repository creation fails");

    assert_eq!(err.tag(), &Tag::CannotCreateRepository);
    let log = workspace.resource_log();
    assert_eq!(log.resources().buckets.len(), 1);
    assert!(log.resources().repositories.is_empty());
}

#[test]
fn test_existing_repository_is_not_tracked() {
    // setup:
    let workspace = Workspace::new();
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(&unreachable_url())
        .with_existing_repository()
        .failing_on(FakeFailure::Deploy);

    // execute:
    let err = provisioner(&workspace, &storage, &target)
        .provision()
        .expect_err("deploy fails");

    // verify: only what this run created is tracked
    assert_eq!(err.tag(), &Tag::CannotDeployService);
    let log = workspace.resource_log();
    assert!(log.resources().repositories.is_empty());
    assert_eq!(log.resources().images, vec![IMAGE.to_string()]);
    assert!(log.resources().services.is_empty());
}

#[test]
fn test_wait_for_unhealthy_service() {
    let workspace = Workspace::new();
    let server = StubServer::start(StubBehavior::ServerError, SERVICE_NAME);
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(server.url());

    let err = provisioner(&workspace, &storage, &target)
        .wait_for_service(server.url())
        .expect_err("service keeps answering 500");

    assert_eq!(err.tag(), &Tag::ServiceNotReachable);
    assert_eq!(server.requests(), vec!["GET /".to_string(), "GET /".to_string()]);
}

#[test]
fn test_wait_for_healthy_service() {
    let workspace = Workspace::new();
    let server = StubServer::start(StubBehavior::Broken, SERVICE_NAME);
    let storage = InMemoryObjectStorage::new();
    let target = FakeDeploymentTarget::new(server.url());

    assert!(
        provisioner(&workspace, &storage, &target)
            .wait_for_service(server.url())
            .is_ok()
    );
    assert_eq!(server.requests(), vec!["GET /".to_string()]);
}
