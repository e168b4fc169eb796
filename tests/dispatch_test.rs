//! Frontend routing and dispatch integration tests.

mod common;

use cms_routes::{ActionContext, ActionRegistry, HandlerRef};
use common::{echo_actions, TestServer};
use serde_json::Value;

#[tokio::test]
async fn test_home_page() {
    let server = TestServer::start().await;
    let client = server.client();

    let response = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["route"], "frontend_index");
    assert_eq!(json["handler"], "frontend::HomeController@index");
    assert_eq!(json["user"], Value::Null);
    assert_eq!(json["url"], server.url("/"));
}

#[tokio::test]
async fn test_page_by_slug() {
    let server = TestServer::start().await;
    let client = server.client();

    let response = client.get(server.url("/page/hello")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["route"], "frontend_page");
    assert_eq!(json["params"]["slug"], "hello");
    assert_eq!(json["url"], server.url("/page/hello"));
}

#[tokio::test]
async fn test_slug_is_percent_decoded() {
    let server = TestServer::start().await;
    let client = server.client();

    let response = client
        .get(server.url("/page/hello%20world"))
        .send()
        .await
        .unwrap();
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["params"]["slug"], "hello world");
}

#[tokio::test]
async fn test_head_served_by_get_route() {
    let server = TestServer::start().await;
    let client = server.client();

    let response = client.head(server.url("/page/about")).send().await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let server = TestServer::start().await;
    let client = server.client();

    let response = client.get(server.url("/no/such/page")).send().await.unwrap();
    assert_eq!(response.status(), 404);

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let server = TestServer::start().await;
    let client = server.client();

    let response = client.post(server.url("/page/about")).send().await.unwrap();
    assert_eq!(response.status(), 405);
    assert_eq!(response.headers()["allow"], "GET, HEAD");

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "method_not_allowed");
}

#[tokio::test]
async fn test_unregistered_action_is_501() {
    let server =
        TestServer::start_with_actions(echo_actions(&["frontend::HomeController@page"])).await;
    let client = server.client();

    let response = client.get(server.url("/page/about")).send().await.unwrap();
    assert_eq!(response.status(), 501);

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "not_implemented");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("frontend::HomeController@page"));

    // Other routes still work
    let response = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_invalid_typed_param_is_400() {
    let mut actions = ActionRegistry::new();
    actions.register(
        HandlerRef::new("frontend", "HomeController", "page"),
        |ctx: ActionContext| async move {
            ctx.param_as::<u32>("slug")
                .map(|number| format!("page number {}", number))
        },
    );
    let server = TestServer::start_with_actions(actions).await;
    let client = server.client();

    let response = client.get(server.url("/page/12")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "page number 12");

    let response = client.get(server.url("/page/twelve")).send().await.unwrap();
    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = TestServer::start().await;
    let client = server.client();

    let response = client.get(server.url("/")).send().await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
