mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use commerce_backend::{handlers, services::payments::PaymentProcessor, AppState};

use crate::common::{seed_bounty, seed_organisation, seed_person, seed_product, setup_test_db};

async fn build_test_app() -> (Router, sea_orm::DatabaseConnection) {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let state = AppState {
        db: db.clone(),
        payments: PaymentProcessor::new(),
    };

    let app = Router::new()
        .route("/carts", post(handlers::cart::create_cart))
        .route("/carts/{id}", get(handlers::cart::get_cart))
        .route("/carts/{id}/items", post(handlers::cart::add_item))
        .route("/point-grants", post(handlers::point_account::grant_points))
        .route(
            "/organisations/{id}/point-account",
            get(handlers::point_account::get_point_account),
        )
        .with_state(state);

    (app, db)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_grant_points_and_read_back_balance() {
    let (app, db) = build_test_app().await;
    let org = seed_organisation(&db, "Test Organisation", "US").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/point-grants",
            json!({
                "organisationId": org.id,
                "amount": 1000,
                "rationale": "Kick-off budget"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["balance"], 1000);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/organisations/{}/point-account", org.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["balance"], 1000);
}

#[tokio::test]
async fn test_unknown_point_account_is_404() {
    let (app, _db) = build_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/organisations/999/point-account")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_flow_over_http() {
    let (app, db) = build_test_app().await;
    let person = seed_person(&db, "Http Buyer").await;
    let org = seed_organisation(&db, "Test Organisation", "US").await;
    let product = seed_product(&db, org.id, "Test Product").await;
    let bounty = seed_bounty(&db, product.id, None, "USD", 10000).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/carts",
            json!({
                "personId": person.id,
                "organisationId": org.id,
                "productId": product.id,
                "country": "US"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "Open");
    let cart_id = body["id"].as_i64().unwrap();

    // Mismatched funding amount is a 400, not a silent correction
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/carts/{}/items", cart_id),
            json!({
                "bountyId": bounty.id,
                "fundingType": "USD",
                "fundingAmount": 9999
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/carts/{}/items", cart_id),
            json!({
                "bountyId": bounty.id,
                "fundingType": "USD",
                "fundingAmount": 10000
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["usd_subtotal_cents"], 10000);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/carts/{}", cart_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}
