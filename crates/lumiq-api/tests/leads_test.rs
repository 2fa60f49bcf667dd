//! Lead submission API integration tests.
//!
//! Run with: `cargo test -p lumiq-api --test leads_test`
//! The relay transport is replaced by an in-memory recorder; no external
//! services are required.

mod helpers;

use helpers::{
    api_path, setup_test_app, setup_test_app_with, test_config, valid_contact_body,
    valid_pilot_body, SendFailure, CONTACT_ACK_TEMPLATE, CONTACT_NOTIFY_TEMPLATE,
    PILOT_ACK_TEMPLATE, PILOT_NOTIFY_TEMPLATE, TEST_SALES_INBOX, TEST_SUPPORT_EMAIL,
};
use lumiq_core::SubmissionKind;
use uuid::Uuid;

#[tokio::test]
async fn test_contact_submission_sends_ack_then_notification() {
    let app = setup_test_app().await;
    let client = app.client();
    let client_ref = Uuid::new_v4();

    let response = client
        .post(&api_path("/leads/contact"))
        .json(&valid_contact_body(client_ref))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["client_ref"], client_ref.to_string());
    assert_eq!(data["status"], "succeeded");
    assert_eq!(data["auto_reply_delivered"], true);
    assert!(
        data["submitted_at"].as_str().is_some(),
        "submitted_at should be an RFC 3339 timestamp"
    );

    // Acknowledgment goes out before the business notification.
    assert_eq!(
        app.transport.sent_templates(),
        vec![CONTACT_ACK_TEMPLATE, CONTACT_NOTIFY_TEMPLATE]
    );

    let params = app
        .transport
        .params_for(CONTACT_NOTIFY_TEMPLATE)
        .expect("notification send should be recorded");
    assert_eq!(params["to_email"], TEST_SALES_INBOX);
    assert_eq!(params["from_name"], "John Doe");
    assert_eq!(params["from_email"], "john@example.com");
    assert_eq!(params["kind"], "general inquiry");
    assert!(
        params["submitted_at"].as_str().unwrap_or("").contains("at"),
        "timestamp should be human-readable: {}",
        params["submitted_at"]
    );
}

#[tokio::test]
async fn test_pilot_submission_uses_pilot_templates() {
    let app = setup_test_app().await;
    let client = app.client();
    let client_ref = Uuid::new_v4();

    let response = client
        .post(&api_path("/leads/pilot"))
        .json(&valid_pilot_body(client_ref))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        app.transport.sent_templates(),
        vec![PILOT_ACK_TEMPLATE, PILOT_NOTIFY_TEMPLATE]
    );

    let params = app
        .transport
        .params_for(PILOT_NOTIFY_TEMPLATE)
        .expect("notification send should be recorded");
    assert_eq!(params["from_name"], "Jane Smith");
    assert_eq!(params["company"], "Acme Lending");
    assert_eq!(params["smb_count"], "250-500");
    assert_eq!(params["consent"], "yes");
}

#[tokio::test]
async fn test_contact_validation_failure_reports_field_errors() {
    let app = setup_test_app().await;
    let client = app.client();
    let client_ref = Uuid::new_v4();

    let response = client
        .post(&api_path("/leads/contact"))
        .json(&serde_json::json!({
            "clientRef": client_ref,
            "firstName": "   ",
            "lastName": "Doe",
            "email": "not-an-email",
            "message": "hi"
        }))
        .await;

    assert_eq!(response.status_code(), 422);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "VALIDATION_FAILED");
    assert_eq!(data["recoverable"], false);
    assert_eq!(data["field_errors"]["firstName"], "First name is required");
    assert_eq!(data["field_errors"]["email"], "Enter a valid email address");
    assert_eq!(
        data["field_errors"]["message"],
        "Message must be at least 10 characters"
    );
    assert!(
        data["field_errors"].get("lastName").is_none(),
        "valid fields should not be reported"
    );

    // Nothing reached the relay.
    assert!(app.transport.sent_templates().is_empty());

    // The form instance settles back to idle, keeping the messages.
    let response = client
        .get(&api_path(&format!("/leads/status/{}", client_ref)))
        .await;
    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "idle");
    assert_eq!(data["field_errors"]["firstName"], "First name is required");
    assert!(data["failure_reason"].is_null());
}

#[tokio::test]
async fn test_pilot_without_consent_fails_only_on_consent() {
    let app = setup_test_app().await;
    let client = app.client();

    let mut body = valid_pilot_body(Uuid::new_v4());
    body["consent"] = serde_json::json!(false);

    let response = client.post(&api_path("/leads/pilot")).json(&body).await;

    assert_eq!(response.status_code(), 422);
    let data: serde_json::Value = response.json();
    let field_errors = data["field_errors"]
        .as_object()
        .expect("field_errors should be a map");
    assert_eq!(field_errors.len(), 1);
    assert_eq!(
        data["field_errors"]["consent"],
        "You must agree to be contacted about the pilot program"
    );
    assert!(app.transport.sent_templates().is_empty());
}

#[tokio::test]
async fn test_auto_reply_failure_does_not_fail_the_submission() {
    let app = setup_test_app().await;
    app.transport.fail_template(
        CONTACT_ACK_TEMPLATE,
        SendFailure::Provider {
            status: 400,
            detail: "recipient address rejected",
        },
    );
    let client = app.client();
    let client_ref = Uuid::new_v4();

    let response = client
        .post(&api_path("/leads/contact"))
        .json(&valid_contact_body(client_ref))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "succeeded");
    assert_eq!(data["auto_reply_delivered"], false);

    // Both sends were attempted despite the acknowledgment failing.
    assert_eq!(
        app.transport.sent_templates(),
        vec![CONTACT_ACK_TEMPLATE, CONTACT_NOTIFY_TEMPLATE]
    );

    let response = client
        .get(&api_path(&format!("/leads/status/{}", client_ref)))
        .await;
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "succeeded");
    assert_eq!(data["auto_reply_delivered"], false);
}

#[tokio::test]
async fn test_notification_failure_maps_to_bad_gateway() {
    let app = setup_test_app().await;
    app.transport.fail_template(
        CONTACT_NOTIFY_TEMPLATE,
        SendFailure::Provider {
            status: 422,
            detail: "The template ID is invalid",
        },
    );
    let client = app.client();
    let client_ref = Uuid::new_v4();

    let response = client
        .post(&api_path("/leads/contact"))
        .json(&valid_contact_body(client_ref))
        .await;

    assert_eq!(response.status_code(), 502);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "NOTIFICATION_DELIVERY_FAILED");
    assert_eq!(data["recoverable"], true);
    let error_msg = data["error"].as_str().unwrap_or("");
    assert!(
        error_msg.contains("The template ID is invalid"),
        "error should carry the relay detail: {}",
        error_msg
    );
    assert!(
        error_msg.contains(TEST_SUPPORT_EMAIL),
        "error should offer the support address: {}",
        error_msg
    );

    let response = client
        .get(&api_path(&format!("/leads/status/{}", client_ref)))
        .await;
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "failed");
    assert_eq!(data["auto_reply_delivered"], true);
    assert!(
        data["failure_reason"].as_str().unwrap_or("").contains("The template ID is invalid"),
        "failure_reason should carry the relay detail: {}",
        data["failure_reason"]
    );
}

#[tokio::test]
async fn test_relay_timeout_maps_to_gateway_timeout() {
    let app = setup_test_app().await;
    app.transport
        .fail_template(CONTACT_NOTIFY_TEMPLATE, SendFailure::Timeout { seconds: 10 });
    let client = app.client();
    let client_ref = Uuid::new_v4();

    let response = client
        .post(&api_path("/leads/contact"))
        .json(&valid_contact_body(client_ref))
        .await;

    assert_eq!(response.status_code(), 504);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "RELAY_TIMEOUT");
    assert_eq!(data["recoverable"], true);
    assert!(
        data["error"].as_str().unwrap_or("").contains("10 seconds"),
        "error should name the deadline: {}",
        data["error"]
    );

    let response = client
        .get(&api_path(&format!("/leads/status/{}", client_ref)))
        .await;
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "failed");
}

#[tokio::test]
async fn test_duplicate_submission_while_in_flight_conflicts() {
    let app = setup_test_app().await;
    let client = app.client();
    let client_ref = Uuid::new_v4();

    // Simulate a dispatch still in flight for this form instance.
    app.state
        .status_store
        .begin(client_ref, SubmissionKind::Contact)
        .await
        .expect("first begin should succeed");

    let response = client
        .post(&api_path("/leads/contact"))
        .json(&valid_contact_body(client_ref))
        .await;

    assert_eq!(response.status_code(), 409);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "SUBMISSION_IN_FLIGHT");
    assert_eq!(data["recoverable"], true);
    assert!(app.transport.sent_templates().is_empty());
}

#[tokio::test]
async fn test_status_for_unknown_client_ref_is_idle() {
    let app = setup_test_app().await;
    let client = app.client();
    let client_ref = Uuid::new_v4();

    let response = client
        .get(&api_path(&format!("/leads/status/{}", client_ref)))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["client_ref"], client_ref.to_string());
    assert_eq!(data["status"], "idle");
    assert!(data["failure_reason"].is_null());
    assert!(data["auto_reply_delivered"].is_null());
}

#[tokio::test]
async fn test_malformed_client_ref_is_bad_request() {
    let app = setup_test_app().await;
    let client = app.client();

    let mut body = valid_contact_body(Uuid::new_v4());
    body["clientRef"] = serde_json::json!(12345);

    let response = client.post(&api_path("/leads/contact")).json(&body).await;

    assert_eq!(response.status_code(), 400);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "BAD_REQUEST");
    let error_msg = data["error"].as_str().unwrap_or("");
    assert!(
        error_msg.contains("clientRef") || error_msg.contains("Invalid request body"),
        "error should point at the malformed body: {}",
        error_msg
    );
    assert!(app.transport.sent_templates().is_empty());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let mut body = valid_contact_body(Uuid::new_v4());
    body["message"] = serde_json::json!("a".repeat(70_000));

    let response = client.post(&api_path("/leads/contact")).json(&body).await;

    assert_eq!(response.status_code(), 413);
    assert!(app.transport.sent_templates().is_empty());
}

#[tokio::test]
async fn test_rate_limit_blocks_after_threshold() {
    let mut config = test_config();
    config.http_rate_limit_per_minute = 2;
    let app = setup_test_app_with(config).await;
    let client = app.client();

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("X-RateLimit-Limit"), "2");
    assert_eq!(response.header("X-RateLimit-Remaining"), "1");

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("X-RateLimit-Remaining"), "0");

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), 429);
    let retry_after = response
        .header("Retry-After")
        .to_str()
        .unwrap_or("")
        .parse::<u64>()
        .expect("Retry-After should be a number of seconds");
    assert!((1..=60).contains(&retry_after));
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "RATE_LIMITED");
    assert_eq!(data["recoverable"], true);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .get("/health")
        .add_header("X-Request-ID", "trace-abc-123")
        .await;
    assert_eq!(response.header("X-Request-ID"), "trace-abc-123");

    let response = client.get("/health").await;
    let generated = response.header("X-Request-ID");
    let generated = generated.to_str().unwrap_or("");
    assert!(
        Uuid::parse_str(generated).is_ok(),
        "generated request ID should be a UUID: {}",
        generated
    );
}

#[tokio::test]
async fn test_health_reports_relay_and_tracked_submissions() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "healthy");
    assert_eq!(data["relay"], "configured");
    assert_eq!(data["tracked_submissions"], 0);

    let response = client
        .post(&api_path("/leads/contact"))
        .json(&valid_contact_body(Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = client.get("/health").await;
    let data: serde_json::Value = response.json();
    assert_eq!(data["tracked_submissions"], 1);

    let response = client.get("/live").await;
    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "alive");

    let response = client.get("/ready").await;
    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["status"], "ready");
}

#[tokio::test]
async fn test_openapi_spec_lists_lead_paths() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    let paths = data["paths"].as_object().expect("paths should be a map");
    assert!(paths.contains_key("/api/v0/leads/contact"));
    assert!(paths.contains_key("/api/v0/leads/pilot"));
    assert!(paths.contains_key("/api/v0/leads/status/{client_ref}"));
}
