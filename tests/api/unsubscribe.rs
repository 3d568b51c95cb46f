use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{json_body, TestApp};

async fn mount_unsubscribe(test_app: &TestApp, email: &str, status: u16) {
    Mock::given(path(format!(
        "{}/{}",
        test_app.audience_contacts_path(),
        email
    )))
    .and(method("PATCH"))
    .and(body_partial_json(serde_json::json!({ "unsubscribed": true })))
    .respond_with(ResponseTemplate::new(status))
    .expect(1)
    .mount(&test_app.email_server)
    .await;
}

#[tokio::test]
async fn unsubscribe_with_query_string_returns_200() {
    let test_app = TestApp::spawn_app().await;

    mount_unsubscribe(&test_app, "frank@test.com", 200).await;

    let response = test_app.get_unsubscribe("frank@test.com").await;

    assert_eq!(200, response.status().as_u16());

    let body = json_body(response).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Successfully unsubscribed");
}

#[tokio::test]
async fn unsubscribe_with_json_body_returns_200() {
    let test_app = TestApp::spawn_app().await;

    mount_unsubscribe(&test_app, "frank@test.com", 200).await;

    let response = test_app
        .post_unsubscribe(serde_json::json!({ "email": "frank@test.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn unsubscribe_post_accepts_the_query_string() {
    let test_app = TestApp::spawn_app().await;

    mount_unsubscribe(&test_app, "frank@test.com", 200).await;

    let response = test_app
        .api_client
        .post(format!("{}/unsubscribe?email=frank@test.com", test_app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn unknown_contacts_are_unsubscribed_successfully() {
    let test_app = TestApp::spawn_app().await;

    mount_unsubscribe(&test_app, "ghost@test.com", 404).await;

    let response = test_app.get_unsubscribe("ghost@test.com").await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn unsubscribe_returns_400_when_email_is_missing_or_invalid() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let missing = test_app
        .api_client
        .get(format!("{}/unsubscribe", test_app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    let invalid = test_app.get_unsubscribe("frank.test.com").await;
    let invalid_body = test_app
        .post_unsubscribe(serde_json::json!({ "email": "nope" }))
        .await;

    for (response, error_message) in [
        (missing, "missing email"),
        (invalid, "email without @ in the query"),
        (invalid_body, "email without @ in the body"),
    ] {
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when {}",
            error_message
        );
    }
}

#[tokio::test]
async fn unsubscribe_returns_500_when_the_provider_fails() {
    let test_app = TestApp::spawn_app().await;

    mount_unsubscribe(&test_app, "frank@test.com", 503).await;

    let response = test_app.get_unsubscribe("frank@test.com").await;

    assert_eq!(500, response.status().as_u16());
    assert!(json_body(response).await.get("error").is_some());
}
