use reqwest::Method;

use crate::helpers::{json_body, TestApp};

#[tokio::test]
async fn preflight_requests_are_answered_on_every_route() {
    let test_app = TestApp::spawn_app().await;

    for route in ["/", "/unsubscribe", "/feedback", "/anything"] {
        let response = test_app
            .api_client
            .request(Method::OPTIONS, format!("{}{}", test_app.address, route))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(204, response.status().as_u16(), "route {}", route);
        assert_eq!(
            response.headers()["Access-Control-Allow-Origin"],
            "*",
            "route {}",
            route
        );
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            "GET, POST, OPTIONS"
        );
    }
}

#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .post_subscription(serde_json::json!({ "email": "nope" }))
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
}

#[tokio::test]
async fn unsupported_methods_return_405() {
    let test_app = TestApp::spawn_app().await;
    let test_cases = [
        (Method::GET, "/"),
        (Method::PUT, "/"),
        (Method::DELETE, "/unsubscribe"),
        (Method::GET, "/feedback"),
    ];

    for (method, route) in test_cases {
        let response = test_app
            .api_client
            .request(method.clone(), format!("{}{}", test_app.address, route))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            405,
            response.status().as_u16(),
            "{} {} was not rejected",
            method,
            route
        );
        assert_eq!(json_body(response).await["error"], "Method not allowed");
    }
}
