use crate::test_runner::cases::TestKind;
use base64::Engine;
use base64::engine::general_purpose;
use chrono::{DateTime, Utc};
use serde_derive::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tera::{Context, Tera};
use thiserror::Error;
use url::Url;

pub const REPORT_FILE_NAME: &str = "report.html";
pub const SCREENSHOTS_DIR_NAME: &str = "screenshots";
const REPORT_TEMPLATE: &str = include_str!("../../templates/report.html.tera");

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum ReportError {
    #[error("Cannot render report: {raw_error_message:?}.")]
    CannotRender { raw_error_message: String },
    #[error("Cannot write report `{path}`: {raw_error_message:?}.")]
    CannotWrite { path: String, raw_error_message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed(String),
}

impl TestStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, TestStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseResult {
    pub name: String,
    pub kind: TestKind,
    pub description: String,
    pub status: TestStatus,
    pub duration: Duration,
    pub screenshot: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub execution_id: String,
    pub target_url: Url,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<TestCaseResult>,
}

impl TestReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| !r.status.is_failed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Screenshots taken during this run, in case order.
    pub fn screenshots(&self) -> Vec<&Path> {
        self.results.iter().filter_map(|r| r.screenshot.as_deref()).collect()
    }
}

#[derive(Serialize)]
struct ReportContext {
    execution_id: String,
    target_url: String,
    started_at: String,
    finished_at: String,
    total: usize,
    passed: usize,
    failed: usize,
    results: Vec<ResultContext>,
}

#[derive(Serialize)]
struct ResultContext {
    name: String,
    kind: String,
    description: String,
    status: String,
    message: Option<String>,
    duration_ms: u128,
    screenshot_file: Option<String>,
    screenshot_base64: Option<String>,
}

fn result_context(result: &TestCaseResult) -> ResultContext {
    let screenshot_base64 = result.screenshot.as_ref().and_then(|path| match fs::read(path) {
        Ok(content) => Some(general_purpose::STANDARD.encode(content)),
        Err(e) => {
            warn!("Cannot embed screenshot `{}` in report: {}", path.display(), e);
            None
        }
    });

    ResultContext {
        name: result.name.to_string(),
        kind: result.kind.to_string(),
        description: result.description.to_string(),
        status: match result.status {
            TestStatus::Passed => "passed".to_string(),
            TestStatus::Failed(_) => "failed".to_string(),
        },
        message: match &result.status {
            TestStatus::Passed => None,
            TestStatus::Failed(message) => Some(message.to_string()),
        },
        duration_ms: result.duration.as_millis(),
        screenshot_file: result
            .screenshot
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string()),
        screenshot_base64,
    }
}

pub fn render_report(report: &TestReport) -> Result<String, ReportError> {
    let report_context = ReportContext {
        execution_id: report.execution_id.to_string(),
        target_url: report.target_url.to_string(),
        started_at: report.started_at.to_rfc3339(),
        finished_at: report.finished_at.to_rfc3339(),
        total: report.results.len(),
        passed: report.passed(),
        failed: report.failed(),
        results: report.results.iter().map(result_context).collect(),
    };

    let context = Context::from_serialize(&report_context).map_err(|e| ReportError::CannotRender {
        raw_error_message: e.to_string(),
    })?;

    let mut tera = Tera::default();
    tera.add_raw_template(REPORT_FILE_NAME, REPORT_TEMPLATE)
        .map_err(|e| ReportError::CannotRender {
            raw_error_message: e.to_string(),
        })?;

    tera.render(REPORT_FILE_NAME, &context)
        .map_err(|e| ReportError::CannotRender {
            raw_error_message: format!("{e:?}"),
        })
}

/// Writes `<output_dir>/report.html` and returns its path.
pub fn write_report(report: &TestReport, output_dir: &Path) -> Result<PathBuf, ReportError> {
    let rendered = render_report(report)?;
    let report_path = output_dir.join(REPORT_FILE_NAME);
    let write_error = |e: std::io::Error| ReportError::CannotWrite {
        path: report_path.to_string_lossy().to_string(),
        raw_error_message: e.to_string(),
    };

    fs::create_dir_all(output_dir).map_err(write_error)?;
    fs::write(&report_path, rendered).map_err(write_error)?;

    Ok(report_path)
}
