use crate::helpers::credentials::{EXECUTION_ID, event_details, logger};
use crate::helpers::http::{StubBehavior, StubServer};
use crate::helpers::screenshot::{PNG_BYTES, RecordingScreenshotter};
use gcp_automation::test_runner::report::{TestReport, TestStatus, render_report, write_report};
use gcp_automation::test_runner::screenshot::Screenshotter;
use gcp_automation::test_runner::{TestRunner, TestRunnerConfig};
use std::path::Path;
use std::time::Duration;

const SERVICE_NAME: &str = "automation-service-a1b2c3d4";

fn test_runner(
    output_dir: &Path,
    include_intentional_failure: bool,
    screenshotter: Option<Box<dyn Screenshotter>>,
) -> TestRunner {
    TestRunner::new(
        TestRunnerConfig {
            output_dir: output_dir.to_path_buf(),
            request_timeout: Duration::from_secs(5),
            include_intentional_failure,
        },
        screenshotter,
        logger(),
        event_details(),
    )
}

fn failed_cases(report: &TestReport) -> Vec<&str> {
    report
        .results
        .iter()
        .filter(|r| r.status.is_failed())
        .map(|r| r.name.as_str())
        .collect()
}

#[test]
fn test_healthy_service_only_fails_intentionally() {
    // setup:
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    let server = StubServer::start(StubBehavior::Healthy, SERVICE_NAME);
    let screenshotter = RecordingScreenshotter::default();
    let runner = test_runner(output_dir.path(), true, Some(Box::new(screenshotter.clone())));

    // execute:
    let report = runner.run(server.url(), SERVICE_NAME).expect("suite should run");

    // verify:
    assert_eq!(report.results.len(), 6);
    assert_eq!(report.passed(), 5);
    assert_eq!(failed_cases(&report), vec!["intentional_failure"]);
    assert_eq!(report.execution_id, EXECUTION_ID);
    assert!(report.started_at <= report.finished_at);

    assert_eq!(screenshotter.captured(), vec![server.url().clone()]);
    let screenshot = report.results[5].screenshot.clone().expect("failure should have a screenshot");
    assert_eq!(screenshot, output_dir.path().join("screenshots").join("intentional_failure.png"));
    assert_eq!(std::fs::read(&screenshot).expect("screenshot written"), PNG_BYTES);

    // every case hit the server, the negative ones on their own route or method
    let requests = server.requests();
    assert!(requests.iter().any(|r| r == "POST /"));
    assert!(requests.iter().any(|r| r.starts_with("GET /") && r != "GET /"));
}

#[test]
fn test_broken_service_fails_checks() {
    // setup:
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    let server = StubServer::start(StubBehavior::Broken, SERVICE_NAME);
    let screenshotter = RecordingScreenshotter::default();
    let runner = test_runner(output_dir.path(), false, Some(Box::new(screenshotter.clone())));

    // execute:
    let report = runner.run(server.url(), SERVICE_NAME).expect("suite should run");

    // verify:
    assert_eq!(report.results.len(), 5);
    assert_eq!(
        failed_cases(&report),
        vec![
            "service_reports_runtime_metadata",
            "service_fetches_example_page",
            "unknown_route_returns_not_found",
            "unsupported_method_is_rejected",
        ]
    );
    assert_eq!(screenshotter.captured().len(), 4);
    assert_eq!(
        report.results[3].status,
        TestStatus::Failed("expected status 404 Not Found, got 200 OK".to_string())
    );
}

#[test]
fn test_server_error_fails_every_case() {
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    let server = StubServer::start(StubBehavior::ServerError, SERVICE_NAME);
    let runner = test_runner(output_dir.path(), false, None);

    let report = runner.run(server.url(), SERVICE_NAME).expect("suite should run");

    assert_eq!(report.failed(), 5);
}

#[test]
fn test_failures_without_screenshotter() {
    // setup:
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    let server = StubServer::start(StubBehavior::Healthy, SERVICE_NAME);
    let runner = test_runner(output_dir.path(), true, None);

    // execute:
    let report = runner.run(server.url(), SERVICE_NAME).expect("suite should run");

    // verify:
    assert_eq!(report.failed(), 1);
    assert!(report.results.iter().all(|r| r.screenshot.is_none()));
    assert!(output_dir.path().join("screenshots").is_dir());
}

#[test]
fn test_failing_screenshotter_does_not_stop_the_suite() {
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    let server = StubServer::start(StubBehavior::Healthy, SERVICE_NAME);
    let screenshotter = RecordingScreenshotter::failing();
    let runner = test_runner(output_dir.path(), true, Some(Box::new(screenshotter.clone())));

    let report = runner.run(server.url(), SERVICE_NAME).expect("suite should run");

    assert_eq!(screenshotter.captured().len(), 1);
    assert_eq!(report.failed(), 1);
    assert!(report.results.iter().all(|r| r.screenshot.is_none()));
}

#[test]
fn test_unreachable_service() {
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    // nothing listens on the discard port
    let target = url::Url::parse("http://127.0.0.1:9/").expect("valid url");
    let runner = test_runner(output_dir.path(), false, None);

    let report = runner.run(&target, SERVICE_NAME).expect("suite should run");

    assert_eq!(report.failed(), 5);
    assert!(matches!(&report.results[0].status, TestStatus::Failed(message) if message.starts_with("request failed")));
}

#[test]
fn test_report_of_a_run() {
    // setup:
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    let server = StubServer::start(StubBehavior::Healthy, SERVICE_NAME);
    let runner = test_runner(output_dir.path(), true, Some(Box::new(RecordingScreenshotter::default())));
    let report = runner.run(server.url(), SERVICE_NAME).expect("suite should run");

    // execute:
    let report_path = write_report(&report, output_dir.path()).expect("report should be written");

    // verify:
    assert_eq!(report_path, output_dir.path().join("report.html"));
    let html = std::fs::read_to_string(&report_path).expect("report readable");
    assert_eq!(html, render_report(&report).expect("report should render"));
    for result in &report.results {
        assert!(html.contains(&result.name), "{} missing from report", result.name);
    }
    // `/` is escaped by the template
    let port = server.url().port().expect("stub has a port");
    assert!(html.contains(&format!("127.0.0.1:{port}")));
    assert!(html.contains("data:image/png;base64,iVBORw0KGgo="));
}

#[test]
fn test_previous_run_output_is_cleared() {
    // setup:
    let output_dir = tempfile::tempdir().expect("cannot create temp dir");
    let screenshots_dir = output_dir.path().join("screenshots");
    std::fs::create_dir_all(&screenshots_dir).expect("cannot create screenshots dir");
    std::fs::write(screenshots_dir.join("intentional_failure.png"), PNG_BYTES).expect("cannot write");
    std::fs::write(output_dir.path().join("report.html"), "<html>previous</html>").expect("cannot write");
    let server = StubServer::start(StubBehavior::Healthy, SERVICE_NAME);
    let runner = test_runner(output_dir.path(), false, Some(Box::new(RecordingScreenshotter::default())));

    // execute:
    let report = runner.run(server.url(), SERVICE_NAME).expect("suite should run");

    // verify:
    assert!(failed_cases(&report).is_empty());
    assert!(report.screenshots().is_empty());
    assert!(!output_dir.path().join("report.html").exists());
    assert!(screenshots_dir.is_dir());
    assert_eq!(std::fs::read_dir(&screenshots_dir).expect("readable").count(), 0);
}
