use activity_service::config::{ActivityConfig, AuditConfig, BotConfig, ChartConfig};
use activity_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TEST_UUID: &str = "test-container";

/// Knobs for one spawned application.
pub struct TestOptions {
    /// Point auditing at a mock Elasticsearch.
    pub with_store: bool,
    pub audit_disabled: bool,
    pub adapter: Option<&'static str>,
    pub chart_disabled: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            with_store: true,
            audit_disabled: false,
            adapter: None,
            chart_disabled: false,
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    /// Stand-in for Elasticsearch; `None` when no endpoint is configured.
    pub store: Option<MockServer>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    pub async fn spawn_with(options: TestOptions) -> Self {
        let store = if options.with_store {
            Some(MockServer::start().await)
        } else {
            None
        };

        let config = ActivityConfig {
            common: CoreConfig {
                port: 0,
                ..CoreConfig::default()
            },
            audit: AuditConfig {
                endpoint: store.as_ref().map(|server| server.uri()),
                container_uuid: TEST_UUID.to_string(),
                disabled: options.audit_disabled,
            },
            chart: ChartConfig {
                disabled: options.chart_disabled,
                base_url: "http://charts.test".to_string(),
            },
            bot: BotConfig {
                name: "hubot".to_string(),
                adapter: options.adapter.map(str::to_string),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.http_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            client,
            store,
        }
    }

    pub fn store(&self) -> &MockServer {
        self.store
            .as_ref()
            .expect("test application has no mock Elasticsearch")
    }

    /// Answer usage searches with a `bot_activity` terms aggregation.
    pub async fn mock_search(&self, buckets: &[(&str, u64)]) {
        let buckets: Vec<Value> = buckets
            .iter()
            .map(|(key, count)| json!({ "key": key, "doc_count": count }))
            .collect();

        Mock::given(method("POST"))
            .and(path("/hubotusage/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": { "total": buckets.len(), "hits": [] },
                "aggregations": { "bot_activity": { "buckets": buckets } }
            })))
            .mount(self.store())
            .await;
    }

    pub async fn mock_index(&self) {
        Mock::given(method("POST"))
            .and(path("/hubotusage/UsageEntry"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "_id": "AVx1", "created": true })),
            )
            .mount(self.store())
            .await;
    }

    /// Requests the mock store received on `route`, waiting briefly for
    /// background writes to land.
    pub async fn store_requests(&self, route: &str, expected: usize) -> Vec<Request> {
        let mut matching = Vec::new();
        for _ in 0..50 {
            matching = self
                .store()
                .received_requests()
                .await
                .unwrap_or_default()
                .into_iter()
                .filter(|request| request.url.path() == route)
                .collect();
            if matching.len() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        matching
    }

    pub async fn post_activity(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/v1/activity", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_message(&self, text: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/v1/messages", self.address))
            .json(&json!({ "user": "mimiron", "text": text }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Send `text` and return `(handled, replies)`.
    pub async fn chat(&self, text: &str) -> (bool, Vec<Value>) {
        let response = self.post_message(text).await;
        assert_eq!(response.status().as_u16(), 200);

        let body: Value = response.json().await.expect("Failed to parse response");
        let handled = body["handled"].as_bool().expect("handled flag missing");
        let replies = body["replies"]
            .as_array()
            .cloned()
            .expect("replies missing");
        (handled, replies)
    }
}
