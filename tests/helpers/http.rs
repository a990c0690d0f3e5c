use serde_json::json;
use tokio::runtime::Runtime;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    /// Answers like the demo container.
    Healthy,
    /// 200 with an empty JSON object to everything.
    Broken,
    /// 500 to everything.
    ServerError,
}

/// Mock HTTP server on a random local port, alive as long as the value.
pub struct StubServer {
    server: MockServer,
    url: Url,
    runtime: Runtime,
}

impl StubServer {
    pub fn start(behavior: StubBehavior, service_name: &str) -> Self {
        let runtime = Runtime::new().expect("cannot build tokio runtime");
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            for mock in mocks(behavior, service_name) {
                mock.mount(&server).await;
            }
            server
        });
        let url = Url::parse(&server.uri()).expect("valid mock server url");

        StubServer { server, url, runtime }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `METHOD /path` of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .map(|request| format!("{} {}", request.method, request.url.path()))
            .collect()
    }
}

fn mocks(behavior: StubBehavior, service_name: &str) -> Vec<Mock> {
    match behavior {
        StubBehavior::ServerError => vec![Mock::given(wiremock::matchers::any()).respond_with(ResponseTemplate::new(500))],
        StubBehavior::Broken => {
            vec![Mock::given(wiremock::matchers::any()).respond_with(ResponseTemplate::new(200).set_body_json(json!({})))]
        }
        StubBehavior::Healthy => vec![
            Mock::given(method("GET"))
                .and(path("/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "service_env": {"K_SERVICE": service_name, "HOSTNAME": "localhost"},
                    "example_status": 200,
                    "example_excerpt": "<h1>Example Domain</h1><p>This domain is for use in documentation examples.</p>",
                })))
                .with_priority(1),
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
                .with_priority(2),
            Mock::given(wiremock::matchers::any())
                .respond_with(ResponseTemplate::new(405).set_body_json(json!({"error": "method not allowed"})))
                .with_priority(3),
        ],
    }
}
