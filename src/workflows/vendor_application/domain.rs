use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::listings::Market;
use crate::store::{FieldValue, Fields};

pub const APPLICATIONS_COLLECTION: &str = "vendor_applications";

/// Provenance tag recorded on every application submitted through this intake.
pub const SUBMISSION_SOURCE: &str = "website";

/// Product categories offered by the intake form, in display order.
pub const PRODUCT_CATEGORIES: [&str; 23] = [
    "Fresh Produce",
    "Organic Vegetables",
    "Fruits & Berries",
    "Herbs & Spices",
    "Baked Goods",
    "Artisan Bread",
    "Pastries & Desserts",
    "Dairy Products",
    "Cheese & Yogurt",
    "Meat & Poultry",
    "Seafood",
    "Prepared Foods",
    "Beverages",
    "Coffee & Tea",
    "Honey & Preserves",
    "Handmade Crafts",
    "Jewelry & Accessories",
    "Artwork",
    "Pottery & Ceramics",
    "Textiles & Clothing",
    "Soaps & Cosmetics",
    "Plants & Flowers",
    "Other",
];

pub fn is_known_category(label: &str) -> bool {
    PRODUCT_CATEGORIES.contains(&label)
}

/// Raw applicant input exactly as typed; nothing is trimmed until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationForm {
    pub selected_market_id: String,
    pub vendor_name: String,
    pub vendor_email: String,
    pub vendor_phone: String,
    pub business_name: String,
    pub business_description: String,
    pub website_url: String,
    pub instagram_handle: String,
    pub product_categories: Vec<String>,
    pub special_requests: String,
}

impl ApplicationForm {
    /// Flip membership of a catalog category. Labels outside the catalog are ignored.
    pub fn toggle_category(&mut self, label: &str) -> bool {
        if !is_known_category(label) {
            return false;
        }

        match self
            .product_categories
            .iter()
            .position(|selected| selected == label)
        {
            Some(index) => {
                self.product_categories.remove(index);
            }
            None => self.product_categories.push(label.to_string()),
        }
        true
    }

    pub fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::VendorName => &mut self.vendor_name,
            FormField::VendorEmail => &mut self.vendor_email,
            FormField::VendorPhone => &mut self.vendor_phone,
            FormField::BusinessName => &mut self.business_name,
            FormField::BusinessDescription => &mut self.business_description,
            FormField::WebsiteUrl => &mut self.website_url,
            FormField::InstagramHandle => &mut self.instagram_handle,
            FormField::SpecialRequests => &mut self.special_requests,
        };
        *slot = value;
    }
}

/// Free-text fields of the form. Market selection and categories have dedicated events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    VendorName,
    VendorEmail,
    VendorPhone,
    BusinessName,
    BusinessDescription,
    WebsiteUrl,
    InstagramHandle,
    SpecialRequests,
}

impl FormField {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::VendorName,
            Self::VendorEmail,
            Self::VendorPhone,
            Self::BusinessName,
            Self::BusinessDescription,
            Self::WebsiteUrl,
            Self::InstagramHandle,
            Self::SpecialRequests,
        ]
    }

    pub fn value(self, form: &ApplicationForm) -> &str {
        match self {
            Self::VendorName => &form.vendor_name,
            Self::VendorEmail => &form.vendor_email,
            Self::VendorPhone => &form.vendor_phone,
            Self::BusinessName => &form.business_name,
            Self::BusinessDescription => &form.business_description,
            Self::WebsiteUrl => &form.website_url,
            Self::InstagramHandle => &form.instagram_handle,
            Self::SpecialRequests => &form.special_requests,
        }
    }
}

/// Read-only summary of the market being applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
}

impl From<&Market> for MarketSummary {
    fn from(market: &Market) -> Self {
        Self {
            id: market.id.clone(),
            name: market.name.clone(),
            address: market.address.clone(),
            city: market.city.clone(),
            state: market.state.clone(),
        }
    }
}

/// First market in `markets` whose id equals `market_id`.
pub fn resolve_market<'a>(markets: &'a [Market], market_id: &str) -> Option<&'a Market> {
    if market_id.is_empty() {
        return None;
    }
    markets.iter().find(|market| market.id == market_id)
}

/// Review status recorded on a new application. Later review states belong to the admin side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
        }
    }
}

/// Client context captured when the applicant presses submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    pub submitted_at: DateTime<Utc>,
    pub user_agent: String,
}

impl SubmissionContext {
    pub fn new(submitted_at: DateTime<Utc>, user_agent: impl Into<String>) -> Self {
        Self {
            submitted_at,
            user_agent: user_agent.into(),
        }
    }

    pub fn now(user_agent: impl Into<String>) -> Self {
        Self::new(Utc::now(), user_agent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    pub source: String,
    pub user_agent: String,
    pub timestamp: String,
}

/// The document written for one successful submission. Built once from a validated form
/// and never changed afterwards; review fields are owned by the organizer tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorApplication {
    market_id: String,
    vendor_id: String,
    vendor_name: String,
    vendor_email: String,
    vendor_phone: Option<String>,
    business_name: String,
    business_description: String,
    product_categories: Vec<String>,
    website_url: Option<String>,
    instagram_handle: Option<String>,
    special_requests: Option<String>,
    status: ApplicationStatus,
    review_notes: Option<String>,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    metadata: SubmissionMetadata,
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl VendorApplication {
    /// Shape a validated form into the stored record.
    pub(crate) fn from_form(form: &ApplicationForm, context: &SubmissionContext) -> Self {
        Self {
            market_id: form.selected_market_id.clone(),
            vendor_id: String::new(),
            vendor_name: form.vendor_name.trim().to_string(),
            vendor_email: form.vendor_email.trim().to_lowercase(),
            vendor_phone: optional(&form.vendor_phone),
            business_name: form.business_name.trim().to_string(),
            business_description: form.business_description.trim().to_string(),
            product_categories: form.product_categories.clone(),
            website_url: optional(&form.website_url),
            instagram_handle: optional(&form.instagram_handle),
            special_requests: optional(&form.special_requests),
            status: ApplicationStatus::Pending,
            review_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: context.submitted_at,
            updated_at: context.submitted_at,
            metadata: SubmissionMetadata {
                source: SUBMISSION_SOURCE.to_string(),
                user_agent: context.user_agent.clone(),
                timestamp: context
                    .submitted_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn vendor_email(&self) -> &str {
        &self.vendor_email
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    pub fn product_categories(&self) -> &[String] {
        &self.product_categories
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> &SubmissionMetadata {
        &self.metadata
    }

    /// Field map written to the store; timestamps stay typed, absent values are explicit nulls.
    pub fn to_fields(&self) -> Fields {
        let mut metadata = Fields::new();
        metadata.insert("source".to_string(), (&self.metadata.source).into());
        metadata.insert("userAgent".to_string(), (&self.metadata.user_agent).into());
        metadata.insert("timestamp".to_string(), (&self.metadata.timestamp).into());

        let mut fields = Fields::new();
        fields.insert("marketId".to_string(), (&self.market_id).into());
        fields.insert("vendorId".to_string(), (&self.vendor_id).into());
        fields.insert("vendorName".to_string(), (&self.vendor_name).into());
        fields.insert("vendorEmail".to_string(), (&self.vendor_email).into());
        fields.insert("vendorPhone".to_string(), self.vendor_phone.clone().into());
        fields.insert("businessName".to_string(), (&self.business_name).into());
        fields.insert(
            "businessDescription".to_string(),
            (&self.business_description).into(),
        );
        fields.insert(
            "productCategories".to_string(),
            self.product_categories.clone().into(),
        );
        fields.insert("websiteUrl".to_string(), self.website_url.clone().into());
        fields.insert(
            "instagramHandle".to_string(),
            self.instagram_handle.clone().into(),
        );
        fields.insert(
            "specialRequests".to_string(),
            self.special_requests.clone().into(),
        );
        fields.insert("status".to_string(), self.status.label().into());
        fields.insert("reviewNotes".to_string(), self.review_notes.clone().into());
        fields.insert("reviewedBy".to_string(), self.reviewed_by.clone().into());
        fields.insert("reviewedAt".to_string(), self.reviewed_at.into());
        fields.insert("createdAt".to_string(), FieldValue::Timestamp(self.created_at));
        fields.insert("updatedAt".to_string(), FieldValue::Timestamp(self.updated_at));
        fields.insert("metadata".to_string(), FieldValue::Map(metadata));
        fields
    }
}
