//! Intake state machine.
//!
//! `LoadingContext → Editing → Submitting → Succeeded`, with a rejected write landing back in
//! `Editing` carrying [`FormError::Submission`]. Every change goes through [`transition`];
//! the returned [`Effect`] names the single remote call the driver must perform next.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::domain::{
    resolve_market, ApplicationForm, FormField, MarketSummary, SubmissionContext,
    VendorApplication,
};
use super::validation::{validate, ValidationError};
use crate::listings::Market;

pub const SUBMISSION_FAILED_MESSAGE: &str =
    "There was an error submitting your application. Please try again.";

pub const CONFIRMATION_MESSAGE: &str = "Thank you for your interest in becoming a vendor. \
     Your application has been submitted successfully and the market organizer will review it shortly.";

/// The message currently blocking the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    Validation(ValidationError),
    Submission,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Validation(err) => write!(f, "{err}"),
            FormError::Submission => f.write_str(SUBMISSION_FAILED_MESSAGE),
        }
    }
}

/// Form state while the applicant can edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditingSession {
    markets: Vec<Market>,
    form: ApplicationForm,
    market_summary: Option<MarketSummary>,
    error: Option<FormError>,
}

impl EditingSession {
    fn new(markets: Vec<Market>, preselected_market_id: Option<&str>) -> Self {
        let mut form = ApplicationForm::default();
        let market_summary = preselected_market_id
            .and_then(|market_id| resolve_market(&markets, market_id))
            .map(|market| {
                form.selected_market_id = market.id.clone();
                MarketSummary::from(market)
            });

        Self {
            markets,
            form,
            market_summary,
            error: None,
        }
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn market_summary(&self) -> Option<&MarketSummary> {
        self.market_summary.as_ref()
    }

    pub fn error(&self) -> Option<FormError> {
        self.error
    }

    /// Ids outside the loaded list clear the selection, as an unknown pre-selection does.
    fn select_market(&mut self, market_id: String) {
        match resolve_market(&self.markets, &market_id) {
            Some(market) => {
                self.market_summary = Some(MarketSummary::from(market));
                self.form.selected_market_id = market_id;
            }
            None => {
                self.market_summary = None;
                self.form.selected_market_id.clear();
            }
        }
    }
}

/// Terminal state after the application was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    document_id: String,
    form: ApplicationForm,
}

impl CompletedSession {
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Always the initial empty form.
    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn message(&self) -> &'static str {
        CONFIRMATION_MESSAGE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    LoadingContext {
        preselected_market_id: Option<String>,
    },
    Editing(EditingSession),
    /// The session is frozen while the single create call is in flight.
    Submitting(EditingSession),
    Succeeded(CompletedSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    LoadingContext,
    Editing,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    ContextLoaded { markets: Vec<Market> },
    MarketSelected(String),
    FieldEdited { field: FormField, value: String },
    CategoryToggled(String),
    SubmitRequested(SubmissionContext),
    SubmissionSucceeded { document_id: String },
    SubmissionFailed,
    ReturnToStart,
}

/// Remote work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadContext,
    CreateApplication(Box<VendorApplication>),
}

impl WorkflowState {
    /// Initial state plus the context load it requires.
    pub fn start(preselected_market_id: Option<String>) -> (Self, Effect) {
        let preselected_market_id = preselected_market_id.filter(|id| !id.trim().is_empty());
        (
            WorkflowState::LoadingContext {
                preselected_market_id,
            },
            Effect::LoadContext,
        )
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::LoadingContext { .. } => WorkflowPhase::LoadingContext,
            WorkflowState::Editing(session) => match session.error {
                Some(FormError::Submission) => WorkflowPhase::Failed,
                _ => WorkflowPhase::Editing,
            },
            WorkflowState::Submitting(_) => WorkflowPhase::Submitting,
            WorkflowState::Succeeded(_) => WorkflowPhase::Succeeded,
        }
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self, WorkflowState::Editing(_))
    }

    pub fn editing(&self) -> Option<&EditingSession> {
        match self {
            WorkflowState::Editing(session) | WorkflowState::Submitting(session) => Some(session),
            _ => None,
        }
    }

    pub fn view(&self) -> WorkflowView {
        let (form, market_summary, error, confirmation) = match self {
            WorkflowState::LoadingContext { .. } => (ApplicationForm::default(), None, None, None),
            WorkflowState::Editing(session) | WorkflowState::Submitting(session) => (
                session.form.clone(),
                session.market_summary.clone(),
                session.error.map(|err| err.to_string()),
                None,
            ),
            WorkflowState::Succeeded(done) => (
                done.form.clone(),
                None,
                None,
                Some(done.message().to_string()),
            ),
        };

        WorkflowView {
            phase: self.phase(),
            can_submit: self.can_submit(),
            form,
            market_summary,
            error,
            confirmation,
        }
    }
}

/// Snapshot handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    pub phase: WorkflowPhase,
    pub can_submit: bool,
    pub form: ApplicationForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_summary: Option<MarketSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<String>,
}

/// Apply one event. Events that make no sense in the current state leave it unchanged.
pub fn transition(state: WorkflowState, event: WorkflowEvent) -> (WorkflowState, Option<Effect>) {
    match (state, event) {
        (
            WorkflowState::LoadingContext {
                preselected_market_id,
            },
            WorkflowEvent::ContextLoaded { markets },
        ) => {
            debug!(markets = markets.len(), "intake context loaded");
            let session = EditingSession::new(markets, preselected_market_id.as_deref());
            (WorkflowState::Editing(session), None)
        }

        (WorkflowState::Editing(mut session), WorkflowEvent::MarketSelected(market_id)) => {
            session.select_market(market_id);
            (WorkflowState::Editing(session), None)
        }

        (WorkflowState::Editing(mut session), WorkflowEvent::FieldEdited { field, value }) => {
            session.form.set(field, value);
            (WorkflowState::Editing(session), None)
        }

        (WorkflowState::Editing(mut session), WorkflowEvent::CategoryToggled(label)) => {
            session.form.toggle_category(&label);
            (WorkflowState::Editing(session), None)
        }

        (WorkflowState::Editing(mut session), WorkflowEvent::SubmitRequested(context)) => {
            if let Err(err) = validate(&session.form) {
                debug!(error = %err, "intake validation blocked submission");
                session.error = Some(FormError::Validation(err));
                return (WorkflowState::Editing(session), None);
            }

            session.error = None;
            let application = VendorApplication::from_form(&session.form, &context);
            (
                WorkflowState::Submitting(session),
                Some(Effect::CreateApplication(Box::new(application))),
            )
        }

        (WorkflowState::Submitting(_), WorkflowEvent::SubmissionSucceeded { document_id }) => (
            WorkflowState::Succeeded(CompletedSession {
                document_id,
                form: ApplicationForm::default(),
            }),
            None,
        ),

        (WorkflowState::Submitting(mut session), WorkflowEvent::SubmissionFailed) => {
            session.error = Some(FormError::Submission);
            (WorkflowState::Editing(session), None)
        }

        (WorkflowState::Succeeded(_), WorkflowEvent::ReturnToStart) => {
            let (state, effect) = WorkflowState::start(None);
            (state, Some(effect))
        }

        (state, event) => {
            debug!(phase = ?state.phase(), ?event, "ignoring event");
            (state, None)
        }
    }
}
