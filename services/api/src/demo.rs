use crate::infra::demo_store;
use clap::Args;
use hipop::error::AppError;
use hipop::listings::{ListingService, DEFAULT_FEATURED_LIMIT};
use hipop::store::{DocumentStore, InMemoryStore};
use hipop::workflows::vendor_application::{
    FormField, SubmissionContext, VendorApplicationService, WorkflowEvent, WorkflowState,
    APPLICATIONS_COLLECTION,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Only list markets in this city.
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Market to pre-select on the application form (defaults to the first public market).
    #[arg(long)]
    pub(crate) market: Option<String>,
    /// Skip the application intake portion of the demo.
    #[arg(long)]
    pub(crate) skip_application: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        city,
        market,
        skip_application,
    } = args;

    let store = Arc::new(demo_store()?);
    let listings = ListingService::new(store.clone());

    println!("HiPop directory demo");
    let markets = match city.as_deref() {
        Some(city) => {
            println!("Markets in {city}:");
            listings.get_markets_by_city(city).await
        }
        None => {
            println!("Public markets:");
            listings.get_public_markets().await
        }
    };
    if markets.is_empty() {
        println!("  (none)");
    }
    for market in &markets {
        let days = if market.operating_days.is_empty() {
            "schedule TBA".to_string()
        } else {
            market.operating_days.join(", ")
        };
        println!(
            "  - {} | {}, {} | {}",
            market.name, market.city, market.state, days
        );
    }

    let featured = listings.get_featured_markets(DEFAULT_FEATURED_LIMIT).await;
    println!("Featured: {} market(s)", featured.len());
    println!(
        "Cities: {}",
        listings.get_cities_with_markets().await.join(", ")
    );

    let vendors = listings.get_public_vendors().await;
    println!("Vendors:");
    for vendor in &vendors {
        println!(
            "  - {} [{}]",
            vendor.business_name,
            vendor.categories.join(", ")
        );
    }

    if skip_application {
        return Ok(());
    }

    let preselected = market.or_else(|| markets.first().map(|market| market.id.clone()));
    run_application(store, preselected).await
}

async fn run_application(
    store: Arc<InMemoryStore>,
    preselected: Option<String>,
) -> Result<(), AppError> {
    println!("\nVendor application intake");
    let service = VendorApplicationService::new(store.clone());

    let mut state = service.start(preselected).await;
    match state.editing().and_then(|session| session.market_summary()) {
        Some(summary) => println!(
            "- Applying to {} ({}, {}, {})",
            summary.name, summary.address, summary.city, summary.state
        ),
        None => println!("- No market pre-selected"),
    }

    for event in demo_edits() {
        state = service.dispatch(state, event).await;
    }
    let state = service
        .submit(state, SubmissionContext::now("hipop-cli/demo"))
        .await;

    match &state {
        WorkflowState::Succeeded(done) => {
            println!("- Submitted application {}", done.document_id());
            println!("  {}", done.message());
            if let Some(document) = store
                .get(APPLICATIONS_COLLECTION, done.document_id())
                .await?
            {
                let stored: serde_json::Value = document.decode()?;
                match serde_json::to_string_pretty(&stored) {
                    Ok(json) => println!("  Stored document:\n{}", json),
                    Err(err) => println!("  Stored document unavailable: {}", err),
                }
            }
        }
        other => {
            let view = other.view();
            println!(
                "- Application not submitted ({})",
                view.error.unwrap_or_else(|| "workflow did not settle".to_string())
            );
        }
    }

    Ok(())
}

fn demo_edits() -> Vec<WorkflowEvent> {
    let field = |field, value: &str| WorkflowEvent::FieldEdited {
        field,
        value: value.to_string(),
    };

    vec![
        field(FormField::VendorName, "Jane Doe"),
        field(FormField::VendorEmail, "Jane@Example.com"),
        field(FormField::BusinessName, "Jane's Jams"),
        field(
            FormField::BusinessDescription,
            "Small-batch preserves from Georgia fruit.",
        ),
        field(FormField::InstagramHandle, "@janesjams"),
        WorkflowEvent::CategoryToggled("Honey & Preserves".to_string()),
        WorkflowEvent::CategoryToggled("Fruits & Berries".to_string()),
    ]
}
