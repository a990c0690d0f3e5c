pub mod cases;
pub mod report;
pub mod screenshot;

use crate::errors::{CommandError, EngineError};
use crate::events::{EngineEvent, EventDetails, EventMessage, Stage, TestingStep, Transmitter};
use crate::logger::Logger;
use crate::test_runner::cases::{TargetContext, TestCase, default_suite};
use crate::test_runner::report::{REPORT_FILE_NAME, SCREENSHOTS_DIR_NAME, TestCaseResult, TestReport, TestStatus};
use crate::test_runner::screenshot::Screenshotter;
use chrono::Utc;
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use url::Url;

#[derive(Debug, Clone)]
pub struct TestRunnerConfig {
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
    pub include_intentional_failure: bool,
}

/// Runs the fixed suite against a deployed service, failures are captured when a screenshotter is available.
pub struct TestRunner {
    config: TestRunnerConfig,
    screenshotter: Option<Box<dyn Screenshotter>>,
    logger: Box<dyn Logger>,
    event_details: EventDetails,
}

impl TestRunner {
    pub fn new(
        config: TestRunnerConfig,
        screenshotter: Option<Box<dyn Screenshotter>>,
        logger: Box<dyn Logger>,
        event_details: EventDetails,
    ) -> Self {
        TestRunner {
            config,
            screenshotter,
            logger,
            event_details: EventDetails::clone_changing_transmitter(&event_details, Transmitter::TestRunner),
        }
    }

    fn details(&self, step: TestingStep) -> EventDetails {
        EventDetails::clone_changing_stage(&self.event_details, Stage::Testing(step))
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.config.output_dir.join(SCREENSHOTS_DIR_NAME)
    }

    /// Runs every case, a failing case never stops the suite.
    pub fn run(&self, target_url: &Url, service_name: &str) -> Result<TestReport, EngineError> {
        let screenshots_dir = self.screenshots_dir();
        self.clear_previous_run(&screenshots_dir).map_err(|e| {
            EngineError::new_cannot_generate_report(self.details(TestingStep::RunSuite), CommandError::from(e))
        })?;

        let client = Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| {
                EngineError::new_cannot_generate_report(
                    self.details(TestingStep::RunSuite),
                    CommandError::new("Cannot build HTTP client".to_string(), Some(e.to_string()), None),
                )
            })?;
        let context = TargetContext {
            client: &client,
            service_name,
        };

        let suite = default_suite(self.config.include_intentional_failure);
        self.logger.log(EngineEvent::Info(
            self.details(TestingStep::RunSuite),
            EventMessage::new_from_safe(format!("Running {} test cases against {}", suite.len(), target_url)),
        ));

        let started_at = Utc::now();
        let results = suite
            .iter()
            .map(|case| self.run_case(case, &context, target_url, &screenshots_dir))
            .collect::<Vec<TestCaseResult>>();

        Ok(TestReport {
            execution_id: self.event_details.execution_id().to_string(),
            target_url: target_url.clone(),
            started_at,
            finished_at: Utc::now(),
            results,
        })
    }

    /// Drops the report and screenshots of an earlier run so none of them pass for this one.
    fn clear_previous_run(&self, screenshots_dir: &Path) -> std::io::Result<()> {
        let report_path = self.config.output_dir.join(REPORT_FILE_NAME);
        if report_path.is_file() {
            fs::remove_file(&report_path)?;
        }
        if screenshots_dir.exists() {
            fs::remove_dir_all(screenshots_dir)?;
        }
        fs::create_dir_all(screenshots_dir)
    }

    fn run_case(&self, case: &TestCase, context: &TargetContext, target_url: &Url, screenshots_dir: &Path) -> TestCaseResult {
        let started = Instant::now();
        let case_url = target_url.join(&case.path);
        let status = match &case_url {
            Ok(url) => case.run(context, url),
            Err(e) => Err(format!("invalid case url: {e}")),
        };
        let duration = started.elapsed();

        let (status, screenshot) = match status {
            Ok(()) => {
                self.logger.log(EngineEvent::Info(
                    self.details(TestingStep::RunSuite),
                    EventMessage::new_from_safe(format!("PASSED {} ({})", case.name, case.kind)),
                ));
                (TestStatus::Passed, None)
            }
            Err(message) => {
                self.logger.log(EngineEvent::Warning(
                    self.details(TestingStep::RunSuite),
                    EventMessage::new_from_safe(format!("FAILED {} ({}): {}", case.name, case.kind, message)),
                ));
                let screenshot = case_url
                    .ok()
                    .and_then(|url| self.capture(case.name, &url, screenshots_dir));
                (TestStatus::Failed(message), screenshot)
            }
        };

        TestCaseResult {
            name: case.name.to_string(),
            kind: case.kind,
            description: case.description.to_string(),
            status,
            duration,
            screenshot,
        }
    }

    fn capture(&self, case_name: &str, url: &Url, screenshots_dir: &Path) -> Option<PathBuf> {
        let details = self.details(TestingStep::CaptureScreenshot);
        let screenshotter = match &self.screenshotter {
            Some(screenshotter) => screenshotter,
            None => {
                self.logger.log(EngineEvent::Warning(
                    details,
                    EventMessage::new_from_safe(format!("No headless browser available, no screenshot for {case_name}")),
                ));
                return None;
            }
        };

        let destination = screenshots_dir.join(format!("{case_name}.png"));
        match screenshotter.capture(url, &destination) {
            Ok(()) => {
                self.logger.log(EngineEvent::Debug(
                    details,
                    EventMessage::new_from_safe(format!("Screenshot saved to {}", destination.display())),
                ));
                Some(destination)
            }
            Err(e) => {
                self.logger.log(EngineEvent::Warning(
                    details,
                    EventMessage::new(
                        format!("Cannot take screenshot for {case_name} with {}", screenshotter.name()),
                        Some(e.to_string()),
                    ),
                ));
                None
            }
        }
    }
}
