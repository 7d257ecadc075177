use anyhow::Result;
use httpmock::prelude::*;
use mailprobe::{ApiCredential, ApiLayerVerifier, AppState};
use serde_json::json;
use std::sync::Arc;
use url::Url;

async fn spawn_app(provider: &MockServer, credential: ApiCredential) -> Result<String> {
    let base = Url::parse(&provider.url("/email_verification"))?;
    let verifier = Arc::new(ApiLayerVerifier::new(base, credential.clone()));
    let app = mailprobe::router(AppState::new(verifier, credential));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(format!("http://{}", addr))
}

fn test_credential() -> ApiCredential {
    ApiCredential::new(Some("test-key".to_string()))
}

fn event_names(body: &str) -> Vec<&str> {
    body.lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .collect()
}

#[tokio::test]
async fn test_stream_emits_protocol_events_and_stops_at_tier_one() -> Result<()> {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(GET)
            .path("/email_verification/jane.doe@acme.com");
        then.status(200)
            .json_body(json!({"is_deliverable": true, "score": 0.95}));
    });
    for email in ["jane@acme.com", "jdoe@acme.com", "janedoe@acme.com"] {
        provider.mock(|when, then| {
            when.method(GET)
                .path(format!("/email_verification/{}", email));
            then.status(200)
                .json_body(json!({"is_deliverable": false, "score": 0.1}));
        });
    }

    let base_url = spawn_app(&provider, test_credential()).await?;
    let response = reqwest::get(format!(
        "{}/api/verify-stream?firstName=Jane&lastName=Doe&domain=acme.com",
        base_url
    ))
    .await?;

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()?
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = response.text().await?;
    assert_eq!(
        event_names(&body),
        vec![
            "init",
            "tier-start",
            "result",
            "result",
            "result",
            "result",
            "tier-complete",
            "complete",
        ]
    );

    // The init event carries the whole plan, tiers that were never
    // verified included.
    assert!(body.contains("doe-jane@acme.com"));
    assert!(body.contains(r#""apiCallsUsed":4"#));
    assert!(body.contains(r#""apiCallsSaved":24"#));
    assert!(body.contains(r#""stoppedAtTier":1"#));
    Ok(())
}

#[tokio::test]
async fn test_stream_walks_every_tier_without_a_hit() -> Result<()> {
    let provider = MockServer::start();
    let all_undeliverable = provider.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .json_body(json!({"is_deliverable": false, "score": 0.1}));
    });

    let base_url = spawn_app(&provider, test_credential()).await?;
    let response = reqwest::get(format!(
        "{}/api/verify-stream?firstName=Jane&lastName=Doe&domain=acme.com",
        base_url
    ))
    .await?;
    let body = response.text().await?;

    let events = event_names(&body);
    assert_eq!(events.iter().filter(|e| **e == "tier-start").count(), 3);
    assert_eq!(events.iter().filter(|e| **e == "tier-complete").count(), 3);
    assert_eq!(events.iter().filter(|e| **e == "result").count(), 28);
    assert_eq!(*events.last().unwrap(), "complete");

    assert!(body.contains(r#""apiCallsUsed":28"#));
    assert!(body.contains(r#""apiCallsSaved":0"#));
    all_undeliverable.assert_hits(28);
    Ok(())
}

#[tokio::test]
async fn test_stream_tier_events_carry_name_and_count() -> Result<()> {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(GET)
            .path("/email_verification/jane.doe@acme.com");
        then.status(200)
            .json_body(json!({"is_deliverable": true, "score": 0.95}));
    });
    for email in ["jane@acme.com", "jdoe@acme.com", "janedoe@acme.com"] {
        provider.mock(|when, then| {
            when.method(GET)
                .path(format!("/email_verification/{}", email));
            then.status(200)
                .json_body(json!({"is_deliverable": false, "score": 0.1}));
        });
    }

    let base_url = spawn_app(&provider, test_credential()).await?;
    let body = reqwest::get(format!(
        "{}/api/verify-stream?firstName=Jane&lastName=Doe&domain=acme.com",
        base_url
    ))
    .await?
    .text()
    .await?;

    assert!(body.contains(r#""name":"most common formats""#));
    assert!(body.contains(r#""count":4"#));
    assert!(body.contains(r#""deliverable":1"#));
    assert!(body.contains(r#""total":4"#));
    Ok(())
}

#[tokio::test]
async fn test_stream_missing_field_is_plain_json_400() -> Result<()> {
    let provider = MockServer::start();
    let catch_all = provider.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!({"is_deliverable": true}));
    });

    let base_url = spawn_app(&provider, test_credential()).await?;
    let response = reqwest::get(format!(
        "{}/api/verify-stream?firstName=Jane&lastName=Doe",
        base_url
    ))
    .await?;

    assert_eq!(response.status(), 400);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()?
        .to_string();
    assert!(content_type.starts_with("application/json"));
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("domain"));
    catch_all.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_stream_without_credential_is_plain_json_500() -> Result<()> {
    let provider = MockServer::start();

    let base_url = spawn_app(&provider, ApiCredential::new(None)).await?;
    let response = reqwest::get(format!(
        "{}/api/verify-stream?firstName=Jane&lastName=Doe&domain=acme.com",
        base_url
    ))
    .await?;

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("API key"));
    Ok(())
}
