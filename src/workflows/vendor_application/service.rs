use std::sync::Arc;

use tracing::{error, info};

use super::domain::{SubmissionContext, APPLICATIONS_COLLECTION};
use super::state::{transition, Effect, WorkflowEvent, WorkflowState};
use crate::listings::ListingService;
use crate::store::DocumentStore;

/// Service driving the intake state machine against the document store.
///
/// The reducer stays pure; this type performs the effects it asks for (the market load on
/// start and the single create per submission) and feeds the outcome back in.
pub struct VendorApplicationService<S: ?Sized> {
    store: Arc<S>,
    listings: ListingService<S>,
}

impl<S> VendorApplicationService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        let listings = ListingService::new(store.clone());
        Self { store, listings }
    }

    /// Load the market options and settle into `Editing`.
    pub async fn start(&self, preselected_market_id: Option<String>) -> WorkflowState {
        let (state, effect) = WorkflowState::start(preselected_market_id);
        self.run(state, Some(effect)).await
    }

    /// Apply an event and perform whatever remote work it triggers.
    pub async fn dispatch(&self, state: WorkflowState, event: WorkflowEvent) -> WorkflowState {
        let (state, effect) = transition(state, event);
        self.run(state, effect).await
    }

    pub async fn submit(&self, state: WorkflowState, context: SubmissionContext) -> WorkflowState {
        self.dispatch(state, WorkflowEvent::SubmitRequested(context))
            .await
    }

    async fn run(&self, mut state: WorkflowState, mut effect: Option<Effect>) -> WorkflowState {
        while let Some(current) = effect.take() {
            let event = match current {
                Effect::LoadContext => WorkflowEvent::ContextLoaded {
                    markets: self.listings.get_public_markets().await,
                },
                Effect::CreateApplication(application) => {
                    match self
                        .store
                        .create(APPLICATIONS_COLLECTION, application.to_fields())
                        .await
                    {
                        Ok(document_id) => {
                            info!(
                                %document_id,
                                market_id = application.market_id(),
                                "vendor application submitted"
                            );
                            WorkflowEvent::SubmissionSucceeded { document_id }
                        }
                        Err(err) => {
                            error!(
                                market_id = application.market_id(),
                                error = %err,
                                "error submitting vendor application"
                            );
                            WorkflowEvent::SubmissionFailed
                        }
                    }
                }
            };
            (state, effect) = transition(state, event);
        }
        state
    }
}
