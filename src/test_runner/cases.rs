use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// Expected behavior of the service.
    Positive,
    /// Misuse the service has to reject, or a deliberate failure.
    Negative,
}

impl Display for TestKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TestKind::Positive => "positive",
            TestKind::Negative => "negative",
        })
    }
}

/// What the checks know about the target.
pub struct TargetContext<'a> {
    pub client: &'a Client,
    pub service_name: &'a str,
}

type Check = fn(&TargetContext, &Url) -> Result<(), String>;

pub struct TestCase {
    pub name: &'static str,
    pub kind: TestKind,
    pub description: &'static str,
    /// Joined to the target URL, also the page captured on failure.
    pub path: String,
    check: Check,
}

impl TestCase {
    pub fn run(&self, context: &TargetContext, url: &Url) -> Result<(), String> {
        (self.check)(context, url)
    }
}

pub const INTENTIONAL_FAILURE: &str = "intentional_failure";

/// Fixed suite, run in this order.
pub fn default_suite(include_intentional_failure: bool) -> Vec<TestCase> {
    let mut cases = vec![
        TestCase {
            name: "service_responds_ok",
            kind: TestKind::Positive,
            description: "GET / returns 200",
            path: "/".to_string(),
            check: service_responds_ok,
        },
        TestCase {
            name: "service_reports_runtime_metadata",
            kind: TestKind::Positive,
            description: "GET / reports the Cloud Run service name and a hostname",
            path: "/".to_string(),
            check: service_reports_runtime_metadata,
        },
        TestCase {
            name: "service_fetches_example_page",
            kind: TestKind::Positive,
            description: "GET / fetched https://example.com successfully",
            path: "/".to_string(),
            check: service_fetches_example_page,
        },
        TestCase {
            name: "unknown_route_returns_not_found",
            kind: TestKind::Negative,
            description: "GET on an unknown route returns 404",
            path: format!("/{}", Uuid::new_v4().simple()),
            check: unknown_route_returns_not_found,
        },
        TestCase {
            name: "unsupported_method_is_rejected",
            kind: TestKind::Negative,
            description: "POST / returns 405",
            path: "/".to_string(),
            check: unsupported_method_is_rejected,
        },
    ];

    if include_intentional_failure {
        cases.push(TestCase {
            name: INTENTIONAL_FAILURE,
            kind: TestKind::Negative,
            description: "Always fails, exercises the failure capture",
            path: "/".to_string(),
            check: intentional_failure,
        });
    }

    cases
}

fn expect_status(actual: StatusCode, expected: StatusCode) -> Result<(), String> {
    match actual == expected {
        true => Ok(()),
        false => Err(format!("expected status {expected}, got {actual}")),
    }
}

fn get_json(context: &TargetContext, url: &Url) -> Result<Value, String> {
    let response = context
        .client
        .get(url.clone())
        .send()
        .map_err(|e| format!("request failed: {e}"))?;
    expect_status(response.status(), StatusCode::OK)?;

    response.json::<Value>().map_err(|e| format!("body is not JSON: {e}"))
}

fn service_responds_ok(context: &TargetContext, url: &Url) -> Result<(), String> {
    let response = context
        .client
        .get(url.clone())
        .send()
        .map_err(|e| format!("request failed: {e}"))?;

    expect_status(response.status(), StatusCode::OK)
}

fn service_reports_runtime_metadata(context: &TargetContext, url: &Url) -> Result<(), String> {
    let body = get_json(context, url)?;
    let service_env = &body["service_env"];

    match service_env["K_SERVICE"].as_str() {
        Some(service) if service == context.service_name => {}
        other => {
            return Err(format!(
                "expected K_SERVICE `{}`, got {}",
                context.service_name,
                other.map(|s| format!("`{s}`")).unwrap_or_else(|| "nothing".to_string())
            ));
        }
    }

    match service_env["HOSTNAME"].as_str() {
        Some(hostname) if !hostname.trim().is_empty() => Ok(()),
        _ => Err("HOSTNAME is missing or empty".to_string()),
    }
}

fn service_fetches_example_page(context: &TargetContext, url: &Url) -> Result<(), String> {
    let body = get_json(context, url)?;

    match body["example_status"].as_u64() {
        Some(200) => {}
        other => return Err(format!("expected example_status 200, got {other:?}")),
    }

    match body["example_excerpt"].as_str() {
        Some(excerpt) if excerpt.contains("Example Domain") => Ok(()),
        _ => Err("example_excerpt doesn't contain `Example Domain`".to_string()),
    }
}

fn unknown_route_returns_not_found(context: &TargetContext, url: &Url) -> Result<(), String> {
    let response = context
        .client
        .get(url.clone())
        .send()
        .map_err(|e| format!("request failed: {e}"))?;

    expect_status(response.status(), StatusCode::NOT_FOUND)
}

fn unsupported_method_is_rejected(context: &TargetContext, url: &Url) -> Result<(), String> {
    let response = context
        .client
        .post(url.clone())
        .send()
        .map_err(|e| format!("request failed: {e}"))?;

    expect_status(response.status(), StatusCode::METHOD_NOT_ALLOWED)
}

fn intentional_failure(_context: &TargetContext, _url: &Url) -> Result<(), String> {
    Err("intentional failure, checks that failures are captured and reported".to_string())
}
