//! Vendor application intake: market context, form editing, validation, and submission.
//!
//! [`state`] holds the pure reducer; [`service`] performs its effects against a
//! [`DocumentStore`](crate::store::DocumentStore); [`router`] exposes the intake over HTTP.

pub mod domain;
pub mod router;
pub mod service;
pub mod state;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    is_known_category, resolve_market, ApplicationForm, ApplicationStatus, FormField,
    MarketSummary, SubmissionContext, SubmissionMetadata, VendorApplication,
    APPLICATIONS_COLLECTION, PRODUCT_CATEGORIES, SUBMISSION_SOURCE,
};
pub use router::application_router;
pub use service::VendorApplicationService;
pub use state::{
    transition, CompletedSession, EditingSession, Effect, FormError, WorkflowEvent,
    WorkflowPhase, WorkflowState, WorkflowView, CONFIRMATION_MESSAGE, SUBMISSION_FAILED_MESSAGE,
};
pub use validation::{is_valid_email, validate, ValidationError};
