//! Console router against a scripted API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use shop_console_admin::routes;
use shop_console_core::Severity;
use shop_console_integration_tests::{FakeApi, category_json, page_json, shop_json};
use tower::ServiceExt;

fn app(api: &FakeApi) -> (Router, shop_console_admin::state::AppState) {
    let state = api.state();
    (routes::routes().with_state(state.clone()), state)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let api = FakeApi::start(|_| (StatusCode::OK, "{}".to_string())).await;
    let (app, _) = app(&api);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_shop_list_page_renders_first_page() {
    let api = FakeApi::start(|_| {
        (
            StatusCode::OK,
            page_json(&[shop_json(1, "Chez Paul"), shop_json(2, "Bio & Co")], 0, 9),
        )
    })
    .await;
    let (app, state) = app(&api);

    let response = app
        .oneshot(Request::get("/shops?search=co").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Chez Paul"));
    assert!(html.contains("Bio &#38; Co") || html.contains("Bio &amp; Co"));
    assert!(!html.contains("Bio & Co"));
    assert!(html.contains("sse-connect=\"/live/"));
    assert_eq!(state.live().len(), 1);
    assert_eq!(api.requests()[0].target, "/shops?page=0&size=9&name=co");
}

#[tokio::test]
async fn test_live_inputs_for_unknown_view_are_not_found() {
    let api = FakeApi::start(|_| (StatusCode::OK, "{}".to_string())).await;
    let (app, _) = app(&api);

    let response = app
        .oneshot(form(
            Method::POST,
            "/live/00000000-0000-0000-0000-000000000000/page",
            "page=2",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_live_page_input_refetches_mounted_list() {
    let api = FakeApi::start(|request| {
        let items: Vec<_> = (1..=12).map(|i| category_json(i, &format!("C{i}"))).collect();
        let page = if request.target.contains("page=1") { 1 } else { 0 };
        (StatusCode::OK, page_json(&items, page, 9))
    })
    .await;
    let (app, state) = app(&api);

    let response = app
        .clone()
        .oneshot(Request::get("/categories").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    let start = html.find("/live/").unwrap() + "/live/".len();
    let view_id = &html[start..start + 36];

    let response = app
        .oneshot(form(Method::POST, &format!("/live/{view_id}/page"), "page=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for _ in 0..50 {
        if api.requests().len() >= 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(api.requests()[1].target, "/categories?page=1&size=9");
    assert_eq!(state.live().len(), 1);
}

#[tokio::test]
async fn test_shop_detail_lists_its_products_six_per_page() {
    let api = FakeApi::start(|request| match request.path() {
        "/shops/3" => (StatusCode::OK, shop_json(3, "Chez Paul").to_string()),
        _ => (StatusCode::OK, page_json(&[], 0, 6)),
    })
    .await;
    let (app, _) = app(&api);

    let response = app
        .oneshot(Request::get("/shops/3").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Chez Paul"));

    let targets: Vec<_> = api.requests().into_iter().map(|r| r.target).collect();
    assert!(targets.contains(&"/products?page=0&size=6&shopId=3".to_string()));
}

#[tokio::test]
async fn test_invalid_category_form_is_rerendered_without_request() {
    let api = FakeApi::start(|_| (StatusCode::OK, "{}".to_string())).await;
    let (app, _) = app(&api);

    let response = app
        .oneshot(form(Method::POST, "/categories", "name=++"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required"));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_overlapping_opening_hours_never_reach_the_api() {
    let api = FakeApi::start(|_| (StatusCode::OK, "{}".to_string())).await;
    let (app, _) = app(&api);

    let response = app
        .oneshot(form(
            Method::POST,
            "/shops",
            "name=Chez+Paul&action=save\
             &hours_id=&hours_day=1&hours_open=09%3A00&hours_close=12%3A00\
             &hours_id=&hours_day=1&hours_open=11%3A00&hours_close=14%3A00",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Opening hours overlap"));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_created_category_redirects_with_success_toast() {
    let api = FakeApi::start(|_| (StatusCode::CREATED, category_json(5, "Food").to_string())).await;
    let (app, state) = app(&api);

    let response = app
        .oneshot(form(Method::POST, "/categories", "name=Food"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/categories/5"
    );

    let toast = state.notifier().current().unwrap();
    assert_eq!(toast.toast.severity, Severity::Success);
}

#[tokio::test]
async fn test_failed_update_keeps_input_and_shows_api_message() {
    let api = FakeApi::start(|_| {
        (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "message": "Nom déjà utilisé" }).to_string(),
        )
    })
    .await;
    let (app, _) = app(&api);

    let response = app
        .oneshot(form(Method::POST, "/categories/5", "name=Food"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Nom déjà utilisé"));
    assert!(html.contains("value=\"Food\""));
}

#[tokio::test]
async fn test_toast_dismissal_is_accepted() {
    let api = FakeApi::start(|_| (StatusCode::OK, "{}".to_string())).await;
    let (app, state) = app(&api);

    let id = state.notifier().info("Saved");
    let response = app
        .oneshot(form(
            Method::POST,
            "/toasts/dismiss",
            &format!("id={id}&reason=close"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.notifier().current().is_none());
}
