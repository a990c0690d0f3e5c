use axum::{Json, Router, http::StatusCode, routing::get};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{info, warn};

const EXAMPLE_URL: &str = "https://example.com";
const EXAMPLE_TIMEOUT: Duration = Duration::from_secs(10);
const EXCERPT_MAX_CHARS: usize = 2000;
const REPORTED_ENV: [&str; 3] = ["K_SERVICE", "K_REVISION", "GCP_PROJECT"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "automation_demo=info".into()),
        )
        .init();

    let app = Router::new().route("/", get(index));

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");
    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reports runtime metadata and an excerpt of the example page.
/// Answers with the upstream status, or 500 when the fetch fails.
async fn index() -> (StatusCode, Json<Value>) {
    let service_env = service_env();

    match fetch_example().await {
        Ok((status, body)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({
                    "service_env": service_env,
                    "example_status": status.as_u16(),
                    "example_excerpt": excerpt(&body),
                })),
            )
        }
        Err(err) => {
            warn!("cannot fetch {EXAMPLE_URL}: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "service_env": service_env,
                    "error": err.to_string(),
                })),
            )
        }
    }
}

async fn fetch_example() -> Result<(u16, String), reqwest::Error> {
    let client = reqwest::Client::builder().timeout(EXAMPLE_TIMEOUT).build()?;
    let response = client.get(EXAMPLE_URL).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;

    Ok((status, body))
}

fn service_env() -> Map<String, Value> {
    let mut env: Map<String, Value> = REPORTED_ENV
        .iter()
        .map(|key| (key.to_string(), std::env::var(key).map(Value::String).unwrap_or(Value::Null)))
        .collect();
    env.insert("HOSTNAME".to_string(), Value::String(hostname()));
    env
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_MAX_CHARS).collect()
}
