use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{ApplicationForm, FormField, SubmissionContext, PRODUCT_CATEGORIES};
use super::service::VendorApplicationService;
use super::state::{FormError, WorkflowEvent, WorkflowState};
use crate::store::DocumentStore;

const UNKNOWN_USER_AGENT: &str = "unknown";

/// Router builder exposing the intake endpoints.
pub fn application_router<S>(service: Arc<VendorApplicationService<S>>) -> Router
where
    S: DocumentStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/vendor-applications", post(submit_handler::<S>))
        .route("/api/v1/product-categories", get(categories_handler))
        .with_state(service)
}

/// Replay a posted form as the edits an applicant would have made.
pub(crate) fn form_events(form: &ApplicationForm) -> Vec<WorkflowEvent> {
    let mut events: Vec<WorkflowEvent> = FormField::ordered()
        .into_iter()
        .map(|field| WorkflowEvent::FieldEdited {
            field,
            value: field.value(form).to_string(),
        })
        .collect();

    let mut seen: Vec<&str> = Vec::new();
    for category in &form.product_categories {
        if !seen.contains(&category.as_str()) {
            seen.push(category);
            events.push(WorkflowEvent::CategoryToggled(category.clone()));
        }
    }

    events
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<VendorApplicationService<S>>>,
    headers: HeaderMap,
    Json(form): Json<ApplicationForm>,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(UNKNOWN_USER_AGENT)
        .to_string();

    let preselected = Some(form.selected_market_id.trim().to_string());
    let mut state = service.start(preselected).await;
    for event in form_events(&form) {
        state = service.dispatch(state, event).await;
    }
    let state = service
        .submit(state, SubmissionContext::now(user_agent))
        .await;

    match &state {
        WorkflowState::Succeeded(done) => {
            let payload = json!({
                "status": "submitted",
                "application_id": done.document_id(),
                "message": done.message(),
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        WorkflowState::Editing(session) => match session.error() {
            Some(FormError::Validation(err)) => {
                let payload = json!({
                    "error": err.to_string(),
                    "view": state.view(),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
            }
            Some(FormError::Submission) => {
                let payload = json!({
                    "error": FormError::Submission.to_string(),
                    "view": state.view(),
                });
                (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
            }
            None => unexpected_state(&state),
        },
        _ => unexpected_state(&state),
    }
}

fn unexpected_state(state: &WorkflowState) -> Response {
    let payload = json!({
        "error": "application workflow did not settle",
        "phase": state.phase(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

pub(crate) async fn categories_handler() -> Json<Vec<&'static str>> {
    Json(PRODUCT_CATEGORIES.to_vec())
}
