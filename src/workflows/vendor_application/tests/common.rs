use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::listings::{Market, MARKETS_COLLECTION};
use crate::store::{Document, FieldValue, Fields, InMemoryStore};
use crate::workflows::vendor_application::domain::{FormField, SubmissionContext};
use crate::workflows::vendor_application::state::{transition, WorkflowEvent, WorkflowState};

pub(super) fn market(id: &str, name: &str, city: &str) -> Market {
    Market {
        id: id.to_string(),
        name: name.to_string(),
        address: "1 Market Way".to_string(),
        city: city.to_string(),
        state: "GA".to_string(),
        description: None,
        operating_days: vec!["Saturday".to_string()],
        operating_hours: BTreeMap::from([("Saturday".to_string(), "8am - 1pm".to_string())]),
        is_active: true,
        is_public: Some(true),
    }
}

pub(super) fn markets() -> Vec<Market> {
    vec![
        market("m1", "Decatur Farmers Market", "Decatur"),
        market("m2", "Grant Park Farmers Market", "Atlanta"),
        market("m3", "Marietta Square Market", "Marietta"),
    ]
}

fn market_document(market: &Market) -> Document {
    let mut fields = Fields::new();
    fields.insert("name".to_string(), (&market.name).into());
    fields.insert("address".to_string(), (&market.address).into());
    fields.insert("city".to_string(), (&market.city).into());
    fields.insert("state".to_string(), (&market.state).into());
    fields.insert(
        "operatingDays".to_string(),
        market.operating_days.clone().into(),
    );
    fields.insert(
        "operatingHours".to_string(),
        FieldValue::Map(
            market
                .operating_hours
                .iter()
                .map(|(day, hours)| (day.clone(), hours.into()))
                .collect(),
        ),
    );
    fields.insert("isActive".to_string(), market.is_active.into());
    Document::new(market.id.clone(), fields)
}

pub(super) fn store_with_markets() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for market in markets() {
        store.insert(MARKETS_COLLECTION, market_document(&market));
    }
    store
}

pub(super) fn context() -> SubmissionContext {
    SubmissionContext::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).unwrap(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5)",
    )
}

pub(super) fn edit(field: FormField, value: &str) -> WorkflowEvent {
    WorkflowEvent::FieldEdited {
        field,
        value: value.to_string(),
    }
}

/// Edits for the reference applicant, excluding the market selection.
pub(super) fn jane_edits() -> Vec<WorkflowEvent> {
    vec![
        edit(FormField::VendorName, "Jane Doe"),
        edit(FormField::VendorEmail, "jane@example.com"),
        edit(FormField::BusinessName, "Jane's Jams"),
        edit(FormField::BusinessDescription, "Homemade preserves"),
        WorkflowEvent::CategoryToggled("Honey & Preserves".to_string()),
    ]
}

pub(super) fn apply_all(state: WorkflowState, events: Vec<WorkflowEvent>) -> WorkflowState {
    events.into_iter().fold(state, |state, event| {
        let (next, effect) = transition(state, event);
        assert!(effect.is_none(), "edits never trigger remote work");
        next
    })
}

/// Editing state with the given markets loaded, driven through the reducer only.
pub(super) fn editing(markets: Vec<Market>, preselected: Option<&str>) -> WorkflowState {
    let (loading, _) = WorkflowState::start(preselected.map(str::to_string));
    let (state, effect) = transition(loading, WorkflowEvent::ContextLoaded { markets });
    assert!(effect.is_none());
    state
}

/// Editing state holding the complete reference application for market `m1`.
pub(super) fn jane_ready() -> WorkflowState {
    apply_all(editing(markets(), Some("m1")), jane_edits())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
