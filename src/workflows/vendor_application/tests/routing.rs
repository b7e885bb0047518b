use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::store::{FieldValue, InMemoryStore};
use crate::workflows::vendor_application::domain::{
    ApplicationForm, APPLICATIONS_COLLECTION, PRODUCT_CATEGORIES,
};
use crate::workflows::vendor_application::router::{
    application_router, form_events, submit_handler,
};
use crate::workflows::vendor_application::service::VendorApplicationService;
use crate::workflows::vendor_application::state::{WorkflowEvent, CONFIRMATION_MESSAGE};

fn jane_payload() -> Value {
    json!({
        "selectedMarketId": "m1",
        "vendorName": "Jane Doe",
        "vendorEmail": "Jane@Example.com",
        "businessName": "Jane's Jams",
        "businessDescription": "Homemade preserves",
        "productCategories": ["Honey & Preserves"],
    })
}

fn post_application(payload: &Value) -> Request<Body> {
    Request::post("/api/v1/vendor-applications")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "integration-suite/1.0")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn service_for(store: Arc<InMemoryStore>) -> Arc<VendorApplicationService<InMemoryStore>> {
    Arc::new(VendorApplicationService::new(store))
}

#[tokio::test]
async fn submit_route_creates_application() {
    let store = store_with_markets();
    let router = application_router(service_for(store.clone()));

    let response = router.oneshot(post_application(&jane_payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "submitted");
    assert_eq!(payload["message"], CONFIRMATION_MESSAGE);

    let documents = store.documents(APPLICATIONS_COLLECTION);
    assert_eq!(documents.len(), 1);
    assert_eq!(payload["application_id"], documents[0].id.as_str());
    assert_eq!(
        documents[0].field("vendorEmail"),
        Some(&"jane@example.com".into())
    );

    let Some(FieldValue::Map(metadata)) = documents[0].field("metadata") else {
        panic!("metadata map missing");
    };
    assert_eq!(
        metadata.get("userAgent"),
        Some(&"integration-suite/1.0".into())
    );
}

#[tokio::test]
async fn submit_route_reports_first_validation_error() {
    let store = store_with_markets();
    let router = application_router(service_for(store.clone()));

    let mut payload = jane_payload();
    payload["vendorEmail"] = json!("jane.example.com");
    payload["productCategories"] = json!([]);

    let response = router.oneshot(post_application(&payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Please enter a valid email address");
    assert_eq!(body["view"]["phase"], "editing");
    assert_eq!(body["view"]["form"]["vendorEmail"], "jane.example.com");
    assert_eq!(store.write_calls(), 0);
}

#[tokio::test]
async fn submit_route_rejects_unknown_market() {
    let store = store_with_markets();
    let router = application_router(service_for(store.clone()));

    let mut payload = jane_payload();
    payload["selectedMarketId"] = json!("closed-market");

    let response = router.oneshot(post_application(&payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Please select a market to apply to");
    assert_eq!(store.write_calls(), 0);
}

#[tokio::test]
async fn submit_handler_returns_bad_gateway_when_write_fails() {
    let store = store_with_markets();
    store.fail_writes(true);
    let service = service_for(store.clone());

    let form: ApplicationForm = serde_json::from_value(jane_payload()).unwrap();
    let response =
        submit_handler::<InMemoryStore>(State(service), HeaderMap::new(), Json(form)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert_eq!(
        body["error"],
        "There was an error submitting your application. Please try again."
    );
    assert_eq!(body["view"]["phase"], "failed");
    assert_eq!(body["view"]["canSubmit"], true);
    assert_eq!(body["view"]["form"]["businessName"], "Jane's Jams");
    assert_eq!(store.write_calls(), 1);
}

#[tokio::test]
async fn submit_handler_defaults_missing_user_agent() {
    let store = store_with_markets();
    let service = service_for(store.clone());

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    let form: ApplicationForm = serde_json::from_value(jane_payload()).unwrap();
    let response = submit_handler::<InMemoryStore>(State(service), headers, Json(form)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let stored = store.documents(APPLICATIONS_COLLECTION).remove(0);
    let Some(FieldValue::Map(metadata)) = stored.field("metadata") else {
        panic!("metadata map missing");
    };
    assert_eq!(metadata.get("userAgent"), Some(&"unknown".into()));
}

#[tokio::test]
async fn product_categories_route_lists_catalog() {
    let router = application_router(service_for(store_with_markets()));

    let response = router
        .oneshot(
            Request::get("/api/v1/product-categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let labels = body.as_array().expect("array payload");
    assert_eq!(labels.len(), PRODUCT_CATEGORIES.len());
    assert_eq!(labels[0], PRODUCT_CATEGORIES[0]);
    assert!(labels.iter().any(|label| label == "Honey & Preserves"));
}

#[test]
fn form_events_toggle_each_category_once() {
    let form = ApplicationForm {
        product_categories: vec![
            "Baked Goods".to_string(),
            "Baked Goods".to_string(),
            "Seafood".to_string(),
        ],
        ..ApplicationForm::default()
    };

    let toggles: Vec<String> = form_events(&form)
        .into_iter()
        .filter_map(|event| match event {
            WorkflowEvent::CategoryToggled(label) => Some(label),
            _ => None,
        })
        .collect();

    assert_eq!(toggles, vec!["Baked Goods", "Seafood"]);
}
