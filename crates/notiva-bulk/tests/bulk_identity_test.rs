//! End-to-end tests for bulk identity-edit submission.

use notiva_bulk::{BulkIdentityEdits, BulkStatus};
use notiva_core::{Config, IdentityEdit};
use serde_json::{json, Value};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String) -> Config {
    Config {
        base_url,
        workspace_key: "ws-key".to_string(),
        workspace_secret: "ws-secret".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn identity_edits_post_to_the_event_endpoint() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/event/"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let mut bulk = BulkIdentityEdits::new(test_config(format!("{}/", server.uri()))).unwrap();
    bulk.append(IdentityEdit::new("user-1").with_operation(json!({"$set": {"name": "Ada"}})));

    let response = bulk.save().await.unwrap();
    assert_eq!(response.status(), BulkStatus::Success);
    assert_eq!(response.total, 1);

    let requests = server.received_requests().await.unwrap();
    let body: Vec<Value> = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body[0]["$schema"], "2");
    assert_eq!(body[0]["distinct_id"], "user-1");
    assert_eq!(body[0]["env"], "ws-key");
    assert_eq!(body[0]["$user_operations"][0]["$set"]["name"], "Ada");
}

#[tokio::test]
async fn empty_edit_warns_but_still_submits() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let mut bulk = BulkIdentityEdits::new(test_config(format!("{}/", server.uri()))).unwrap();
    bulk.append(IdentityEdit::new("user-1"));

    let response = bulk.save().await.unwrap();
    assert_eq!(response.status(), BulkStatus::Success);
    assert_eq!(response.total, 1);
    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].contains("no operations"));
}

#[tokio::test]
async fn oversized_edit_becomes_a_failed_record() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let mut bulk = BulkIdentityEdits::new(test_config(format!("{}/", server.uri()))).unwrap();
    bulk.append(IdentityEdit::new("user-1").with_operation(json!({"$set": {"ok": true}})));
    // Over the 10 KiB identity ceiling.
    bulk.append(
        IdentityEdit::new("user-2")
            .with_operation(json!({"$set": {"blob": "x".repeat(20 * 1024)}})),
    );

    let response = bulk.save().await.unwrap();
    assert_eq!(response.status(), BulkStatus::Partial);
    assert_eq!(response.total, 2);
    assert_eq!(response.success, 1);
    assert_eq!(response.failure, 1);
    assert!(response.failed_records[0].error.contains("record too big"));
    assert_eq!(response.failed_records[0].record["distinct_id"], "user-2");
}

#[tokio::test]
async fn identity_batches_split_at_four_hundred_records() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(2)
        .mount(&server)
        .await;

    let mut bulk = BulkIdentityEdits::new(test_config(format!("{}/", server.uri()))).unwrap();
    bulk.append_all((0..450).map(|i| {
        IdentityEdit::new(format!("user-{i}")).with_operation(json!({"$set": {"n": i}}))
    }));

    let response = bulk.save().await.unwrap();
    assert_eq!(response.total, 450);
    assert_eq!(response.success, 450);

    let requests = server.received_requests().await.unwrap();
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| serde_json::from_slice::<Vec<Value>>(&r.body).unwrap().len())
        .collect();
    assert_eq!(sizes, vec![400, 50]);
}
