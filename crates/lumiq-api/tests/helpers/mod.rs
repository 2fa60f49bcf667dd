//! Test helpers: build AppState and router around a recording mock transport.
//!
//! Run from workspace root: `cargo test -p lumiq-api --test leads_test` or
//! `cargo test -p lumiq-api`. No external services are needed; the relay is
//! replaced by an in-memory transport.

use async_trait::async_trait;
use axum_test::TestServer;
use lumiq_api::constants;
use lumiq_api::setup::routes;
use lumiq_api::state::AppState;
use lumiq_core::{Config, RelayConfig};
use lumiq_relay::{
    LeadDispatcher, RelayError, RelayReceipt, RelayTransport, StatusStore,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_SALES_INBOX: &str = "sales@lumiq.ai";
pub const TEST_SUPPORT_EMAIL: &str = "support@lumiq.ai";

pub const CONTACT_ACK_TEMPLATE: &str = "tpl_contact_ack";
pub const CONTACT_NOTIFY_TEMPLATE: &str = "tpl_contact_notify";
pub const PILOT_ACK_TEMPLATE: &str = "tpl_pilot_ack";
pub const PILOT_NOTIFY_TEMPLATE: &str = "tpl_pilot_notify";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// How the mock transport fails a send for one template. Templates without a
/// registered failure succeed.
pub enum SendFailure {
    Provider { status: u16, detail: &'static str },
    Timeout { seconds: u64 },
}

/// Records every relay send and fails the templates it was told to fail.
#[derive(Default)]
pub struct RecordingTransport {
    failures: Mutex<HashMap<String, SendFailure>>,
    sends: Mutex<Vec<(String, JsonValue)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_template(&self, template_id: &str, failure: SendFailure) {
        self.failures
            .lock()
            .unwrap()
            .insert(template_id.to_string(), failure);
    }

    pub fn sent_templates(&self) -> Vec<String> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .map(|(template, _)| template.clone())
            .collect()
    }

    pub fn params_for(&self, template_id: &str) -> Option<JsonValue> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .find(|(template, _)| template == template_id)
            .map(|(_, params)| params.clone())
    }
}

#[async_trait]
impl RelayTransport for RecordingTransport {
    async fn send_template(
        &self,
        template_id: &str,
        params: JsonValue,
    ) -> Result<RelayReceipt, RelayError> {
        self.sends
            .lock()
            .unwrap()
            .push((template_id.to_string(), params));
        match self.failures.lock().unwrap().get(template_id) {
            None => Ok(RelayReceipt {
                status: 200,
                text: "OK".to_string(),
            }),
            Some(SendFailure::Provider { status, detail }) => Err(RelayError::Provider {
                status: *status,
                detail: detail.to_string(),
            }),
            Some(SendFailure::Timeout { seconds }) => Err(RelayError::Timeout {
                seconds: *seconds,
            }),
        }
    }
}

/// Test application: server, the recording transport, and shared state.
pub struct TestApp {
    pub server: TestServer,
    pub transport: Arc<RecordingTransport>,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup test app with the default test configuration.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config()).await
}

/// Setup test app around a custom configuration (e.g. a low rate limit).
pub async fn setup_test_app_with(config: Config) -> TestApp {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = LeadDispatcher::new(&config, transport.clone() as Arc<dyn RelayTransport>);
    let status_store = Arc::new(StatusStore::new());

    let state = Arc::new(AppState {
        config: config.clone(),
        dispatcher,
        status_store,
    });

    let app = routes::setup_routes(&config, state.clone())
        .await
        .expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        transport,
        state,
    }
}

pub fn test_config() -> Config {
    Config {
        server_port: 3000,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        relay: RelayConfig {
            api_base: "http://localhost:9100".to_string(),
            service_id: "service_lumiq".to_string(),
            public_key: "test_public_key".to_string(),
            private_key: None,
            contact_auto_reply_template: CONTACT_ACK_TEMPLATE.to_string(),
            contact_notification_template: CONTACT_NOTIFY_TEMPLATE.to_string(),
            pilot_auto_reply_template: PILOT_ACK_TEMPLATE.to_string(),
            pilot_notification_template: PILOT_NOTIFY_TEMPLATE.to_string(),
            timeout_seconds: 10,
        },
        sales_inbox: TEST_SALES_INBOX.to_string(),
        support_email: TEST_SUPPORT_EMAIL.to_string(),
        business_timezone: chrono_tz::America::New_York,
        http_rate_limit_per_minute: 1000,
        submission_ttl_seconds: 3600,
        max_body_bytes: 64 * 1024,
    }
}

/// A valid contact form body for the given form instance.
pub fn valid_contact_body(client_ref: Uuid) -> JsonValue {
    serde_json::json!({
        "clientRef": client_ref,
        "firstName": "John",
        "lastName": "Doe",
        "email": "john@example.com",
        "message": "I would like to learn more about the credit platform."
    })
}

/// A valid pilot application body for the given form instance.
pub fn valid_pilot_body(client_ref: Uuid) -> JsonValue {
    serde_json::json!({
        "clientRef": client_ref,
        "name": "Jane Smith",
        "title": "CTO",
        "company": "Acme Lending",
        "email": "jane@acme.example",
        "phone": "+1 (555) 010-2000",
        "smbCount": "250-500",
        "consent": true
    })
}
