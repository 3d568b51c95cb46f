use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{json_body, TestApp, FORWARD_EMAIL};

#[tokio::test]
async fn feedback_is_forwarded_with_the_sender_as_reply_to() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "to": [FORWARD_EMAIL],
            "reply_to": "fan@test.com",
            "subject": "[50-Point Alerts] feature feedback"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "e" })))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_feedback(serde_json::json!({
            "message": "Add WNBA alerts please",
            "email": "fan@test.com",
            "type": "feature"
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(json_body(response).await["success"], true);
}

#[tokio::test]
async fn anonymous_feedback_is_accepted() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "e" })))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_feedback(serde_json::json!({ "message": "Love it" }))
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn feedback_accepts_json_sent_as_plain_text() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "e" })))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .api_client
        .post(format!("{}/feedback", test_app.address))
        .header("Content-Type", "text/plain;charset=UTF-8")
        .body(r#"{"message":"Love it","type":"feature"}"#)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn feedback_returns_400_when_body_is_invalid() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let test_cases = vec![
        (serde_json::json!({}), "missing message"),
        (serde_json::json!({ "message": "   " }), "blank message"),
        (
            serde_json::json!({ "message": "Hi", "email": "not-an-email" }),
            "invalid email",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_feedback(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn feedback_returns_500_when_no_recipient_is_configured() {
    let test_app = TestApp::spawn_app_with(|config| {
        config.email_client.forward_email = None;
    })
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_feedback(serde_json::json!({ "message": "Love it" }))
        .await;

    assert_eq!(500, response.status().as_u16());
}

#[tokio::test]
async fn feedback_returns_500_when_the_provider_fails() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_feedback(serde_json::json!({ "message": "Love it" }))
        .await;

    assert_eq!(500, response.status().as_u16());
    assert!(json_body(response).await.get("error").is_some());
}
