use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{json_body, TestApp, ADMIN_EMAIL};

#[tokio::test]
async fn subscribe_returns_200_when_body_is_valid() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path(test_app.audience_contacts_path()))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "email": "frank@test.com",
            "unsubscribed": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "1" })))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_subscription(serde_json::json!({ "email": " Frank@Test.com " }))
        .await;

    assert_eq!(200, response.status().as_u16());

    let body = json_body(response).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Successfully subscribed!");
}

#[tokio::test]
async fn subscribe_accepts_json_sent_as_plain_text() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path(test_app.audience_contacts_path()))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({ "email": "frank@test.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "1" })))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .api_client
        .post(format!("{}/", test_app.address))
        .header("Content-Type", "text/plain;charset=UTF-8")
        .body(r#"{"email":"frank@test.com"}"#)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let body = json_body(response).await;

    assert_eq!(body["message"], "Successfully subscribed!");
}

#[tokio::test]
async fn subscribe_returns_400_when_email_is_missing_or_invalid() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases = vec![
        (serde_json::json!({}), "missing email parameter"),
        (serde_json::json!({ "email": "" }), "empty email"),
        (serde_json::json!({ "email": "frank.test.com" }), "email without @"),
        (serde_json::json!({ "email": 42 }), "email is not a string"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscription(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );

        let body = json_body(response).await;

        assert!(
            body.get("error").is_some(),
            "The API did not return an error body when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn subscribe_returns_400_when_body_is_not_json() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .api_client
        .post(format!("{}/", test_app.address))
        .header("Content-Type", "application/json")
        .body("email=frank@test.com")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    assert!(json_body(response).await.get("error").is_some());
}

#[tokio::test]
async fn subscribe_treats_existing_contacts_as_success() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path(test_app.audience_contacts_path()))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "statusCode": 409,
            "message": "Contact already exists"
        })))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_subscription(serde_json::json!({ "email": "frank@test.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        json_body(response).await["message"],
        "You're already subscribed!"
    );
}

#[tokio::test]
async fn subscribe_returns_500_when_the_provider_fails() {
    let test_app = TestApp::spawn_app().await;

    test_app.mount_create_contact(500).await;

    let response = test_app
        .post_subscription(serde_json::json!({ "email": "frank@test.com" }))
        .await;

    assert_eq!(500, response.status().as_u16());
    assert!(json_body(response).await.get("error").is_some());
}

#[tokio::test]
async fn subscribe_notifies_the_admin_when_configured() {
    let test_app = TestApp::spawn_app_with(|config| {
        config.email_client.admin_email = Some(String::from(ADMIN_EMAIL));
    })
    .await;

    test_app.mount_create_contact(200).await;
    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({ "to": [ADMIN_EMAIL] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "e" })))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_subscription(serde_json::json!({ "email": "frank@test.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_succeeds_even_if_the_admin_notice_fails() {
    let test_app = TestApp::spawn_app_with(|config| {
        config.email_client.admin_email = Some(String::from(ADMIN_EMAIL));
    })
    .await;

    test_app.mount_create_contact(200).await;
    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app
        .post_subscription(serde_json::json!({ "email": "frank@test.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
}
