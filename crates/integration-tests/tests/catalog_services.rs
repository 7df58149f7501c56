//! Catalog services against a scripted API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;
use shop_console_admin::api::ApiError;
use shop_console_admin::list::{ListQuery, ListSource};
use shop_console_admin::services::{ProductFilter, ShopFilter};
use shop_console_core::{CategoryId, MinimalCategory, MinimalShop, Severity, ShopId};
use shop_console_integration_tests::{FakeApi, category_json, page_json, shop_json};

#[tokio::test]
async fn test_update_without_id_sends_nothing() {
    let api = FakeApi::start(|_| (StatusCode::OK, "{}".to_string())).await;
    let state = api.state();

    let draft = MinimalShop {
        name: "Chez Paul".to_string(),
        ..MinimalShop::default()
    };
    let err = state.shops().update(&draft).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_rejected_create_raises_error_toast_with_body_text() {
    let api = FakeApi::start(|_| (StatusCode::BAD_REQUEST, "Nom déjà utilisé".to_string())).await;
    let state = api.state();

    let draft = MinimalCategory {
        id: None,
        name: "Food".to_string(),
    };
    let err = state.categories().create(&draft).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    let toast = state.notifier().current().unwrap();
    assert_eq!(toast.toast.severity, Severity::Error);
    assert_eq!(toast.toast.message, "Nom déjà utilisé");

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path(), "/categories");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&requests[0].body).unwrap(),
        json!({ "name": "Food" })
    );
}

#[tokio::test]
async fn test_json_error_body_is_serialized_into_toast() {
    let api = FakeApi::start(|_| {
        (
            StatusCode::CONFLICT,
            json!({ "message": "Shop has products" }).to_string(),
        )
    })
    .await;
    let state = api.state();

    let err = state.shops().remove(ShopId::new(3)).await.unwrap_err();
    assert_eq!(err.form_message(), "Shop has products");

    let toast = state.notifier().current().unwrap();
    assert!(toast.toast.message.contains("Shop has products"));
    assert_eq!(api.requests()[0].method, Method::DELETE);
    assert_eq!(api.requests()[0].path(), "/shops/3");
}

#[tokio::test]
async fn test_unknown_id_maps_to_not_found() {
    let api = FakeApi::start(|_| (StatusCode::NOT_FOUND, String::new())).await;
    let state = api.state();

    let err = state.shops().get(ShopId::new(42)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn test_remove_deletes_by_id() {
    let api = FakeApi::start(|_| (StatusCode::NO_CONTENT, String::new())).await;
    let state = api.state();

    state.shops().remove(ShopId::new(7)).await.unwrap();

    let requests = api.requests();
    assert_eq!(requests[0].method, Method::DELETE);
    assert_eq!(requests[0].target, "/shops/7");
    assert!(state.notifier().current().is_none());
}

#[tokio::test]
async fn test_page_of_five_maps_to_one_displayed_page() {
    let api = FakeApi::start(|_| {
        let items: Vec<_> = (1..=5).map(|i| category_json(i, &format!("C{i}"))).collect();
        (StatusCode::OK, page_json(&items, 0, 9))
    })
    .await;
    let state = api.state();

    let page = state.categories().list(0, 9).await.unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.displayed_page(), 1);
    assert_eq!(api.requests()[0].target, "/categories?page=0&size=9");
}

#[tokio::test]
async fn test_sort_key_wins_over_filter_on_the_wire() {
    let api = FakeApi::start(|_| (StatusCode::OK, page_json(&[shop_json(1, "A")], 0, 9))).await;
    let state = api.state();

    let mut query = ListQuery::filtered(
        ShopFilter {
            in_vacations: Some(true),
            ..ShopFilter::default()
        }
        .expression(),
    );
    state.shops().fetch(query.request(9)).await.unwrap();

    query.set_sort(Some("name".to_string()));
    query.set_search("Chez Paul");
    state.shops().fetch(query.request(9)).await.unwrap();

    let targets: Vec<_> = api.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(
        targets,
        vec![
            "/shops?page=0&size=9&inVacations=true".to_string(),
            "/shops?page=0&size=9&sortBy=name&name=Chez%20Paul".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_products_of_shop_use_filtered_listing() {
    let api = FakeApi::start(|_| (StatusCode::OK, page_json(&[], 0, 9))).await;
    let state = api.state();

    let page = state
        .products()
        .list_by_shop(ShopId::new(4), 1, 9)
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(api.requests()[0].target, "/products?page=1&size=9&shopId=4");
}

#[tokio::test]
async fn test_products_of_shop_category_and_unfiltered() {
    let api = FakeApi::start(|_| (StatusCode::OK, page_json(&[], 0, 9))).await;
    let state = api.state();
    let products = state.products();

    products
        .list_by_shop_and_category(ShopId::new(4), CategoryId::new(2), 0, 9)
        .await
        .unwrap();
    products
        .list_matching(ProductFilter::default(), 0, 9)
        .await
        .unwrap();

    let targets: Vec<_> = api.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(
        targets,
        vec![
            "/products?page=0&size=9&shopId=4&categoryId=2".to_string(),
            "/products?page=0&size=9".to_string(),
        ]
    );
}
