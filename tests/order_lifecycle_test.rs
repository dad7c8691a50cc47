//! Order lifecycle over HTTP: creation defaults, status transitions,
//! delivery stamping and terminal states.

mod common;

use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn created_order_starts_in_draft_with_computed_total() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_as_admin(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "description": "Structural steel beams",
                "quantity": "40",
                "unit_price": "125.50"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let order = &body["data"];
    assert_eq!(order["status"], json!("Draft"));
    assert_eq!(order["currency"], json!("QAR"));
    let total: f64 = order["total_amount"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, 5020.0);
    assert!(order["order_number"]
        .as_str()
        .is_some_and(|n| !n.is_empty()));
    assert!(order["previous_status"].is_null());
}

#[tokio::test]
async fn status_change_preserves_previous_status_and_stamps_actor() {
    let app = TestApp::new().await;
    let order = app
        .state
        .services
        .orders
        .create_order(
            serde_json::from_value(json!({
                "description": "Cement",
                "quantity": "10",
                "unit_price": "7"
            }))
            .unwrap(),
            &app.admin_actor(),
        )
        .await
        .unwrap();

    let (status, body) = app
        .request_as_admin(
            Method::POST,
            &format!("/api/v1/orders/{}/status", order.id),
            Some(json!({"status": "Approved"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Status updated successfully"));
    let updated = &body["data"];
    assert_eq!(updated["status"], json!("Approved"));
    assert_eq!(updated["previous_status"], json!("Draft"));
    assert_eq!(updated["status_changed_by"], json!("Root Admin"));
    assert!(!updated["status_changed_at"].is_null());
}

#[tokio::test]
async fn first_delivery_stamps_the_delivery_date_exactly_once() {
    let app = TestApp::new().await;
    let order = app
        .state
        .services
        .orders
        .create_order(
            serde_json::from_value(json!({
                "description": "Cabling",
                "quantity": "3",
                "unit_price": "9"
            }))
            .unwrap(),
            &app.admin_actor(),
        )
        .await
        .unwrap();
    let uri = format!("/api/v1/orders/{}/status", order.id);

    let (_, body) = app
        .request_as_admin(Method::POST, &uri, Some(json!({"status": "Delivered"})))
        .await;
    let stamped = body["data"]["actual_delivery_date"].clone();
    assert!(!stamped.is_null());

    // A later re-delivery (after an invoicing detour) must keep the
    // original timestamp.
    app.request_as_admin(Method::POST, &uri, Some(json!({"status": "Invoiced"})))
        .await;
    let (_, body) = app
        .request_as_admin(Method::POST, &uri, Some(json!({"status": "Delivered"})))
        .await;
    assert_eq!(body["data"]["actual_delivery_date"], stamped);
}

#[tokio::test]
async fn closed_orders_reject_further_transitions() {
    let app = TestApp::new().await;
    let order = app
        .state
        .services
        .orders
        .create_order(
            serde_json::from_value(json!({
                "description": "Paint",
                "quantity": "1",
                "unit_price": "5"
            }))
            .unwrap(),
            &app.admin_actor(),
        )
        .await
        .unwrap();
    let uri = format!("/api/v1/orders/{}/status", order.id);

    app.request_as_admin(Method::POST, &uri, Some(json!({"status": "Closed"})))
        .await;
    let (status, body) = app
        .request_as_admin(Method::POST, &uri, Some(json!({"status": "Draft"})))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("Conflict"));
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("can no longer change status"));
}

#[tokio::test]
async fn unknown_status_is_a_conflict_and_empty_status_a_validation_error() {
    let app = TestApp::new().await;
    let order = app
        .state
        .services
        .orders
        .create_order(
            serde_json::from_value(json!({
                "description": "Bolts",
                "quantity": "100",
                "unit_price": "0.2"
            }))
            .unwrap(),
            &app.admin_actor(),
        )
        .await
        .unwrap();
    let uri = format!("/api/v1/orders/{}/status", order.id);

    let (status, _) = app
        .request_as_admin(Method::POST, &uri, Some(json!({"status": "Vaporized"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request_as_admin(Method::POST, &uri, Some(json!({"status": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_order_returns_not_found() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/orders/{}", uuid::Uuid::new_v4());

    let (status, body) = app.request_as_admin(Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not Found"));
    assert!(!body["timestamp"].is_null());
}

#[tokio::test]
async fn listing_orders_returns_the_pagination_envelope() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.state
            .services
            .orders
            .create_order(
                serde_json::from_value(json!({
                    "description": format!("Item {i}"),
                    "quantity": "1",
                    "unit_price": "2"
                }))
                .unwrap(),
                &app.admin_actor(),
            )
            .await
            .unwrap();
    }

    let (status, body) = app
        .request_as_admin(Method::GET, "/api/v1/orders?page=1&per_page=2", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["total"], json!(3));
    assert_eq!(data["page"], json!(1));
    assert_eq!(data["limit"], json!(2));
    assert_eq!(data["total_pages"], json!(2));
}

#[tokio::test]
async fn deleted_orders_stop_resolving() {
    let app = TestApp::new().await;
    let order = app
        .state
        .services
        .orders
        .create_order(
            serde_json::from_value(json!({
                "description": "Scaffolding",
                "quantity": "2",
                "unit_price": "300"
            }))
            .unwrap(),
            &app.admin_actor(),
        )
        .await
        .unwrap();
    let uri = format!("/api/v1/orders/{}", order.id);

    let (status, _) = app.request_as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request_as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
