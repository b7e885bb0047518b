//! Listing Query Layer: read-only market and vendor directories.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{distinct_cities, Market, Vendor, MARKETS_COLLECTION, VENDORS_COLLECTION};
pub use router::{listing_router, DEFAULT_FEATURED_LIMIT};
pub use service::ListingService;
