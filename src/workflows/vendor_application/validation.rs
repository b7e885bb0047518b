use std::sync::OnceLock;

use regex::Regex;

use super::domain::ApplicationForm;

/// Blocking form errors. The display text is shown to the applicant verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a market to apply to")]
    MissingMarket,
    #[error("Vendor name is required")]
    MissingVendorName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Business name is required")]
    MissingBusinessName,
    #[error("Business description is required")]
    MissingBusinessDescription,
    #[error("Please select at least one product category")]
    MissingCategories,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|err| {
            unreachable!("email pattern is a valid literal: {err}")
        })
    })
}

/// `local@domain.tld` shape check on the trimmed address.
pub fn is_valid_email(raw: &str) -> bool {
    email_pattern().is_match(raw.trim())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check the rules in display order and report the first one that fails.
pub fn validate(form: &ApplicationForm) -> Result<(), ValidationError> {
    if is_blank(&form.selected_market_id) {
        return Err(ValidationError::MissingMarket);
    }
    if is_blank(&form.vendor_name) {
        return Err(ValidationError::MissingVendorName);
    }
    if is_blank(&form.vendor_email) {
        return Err(ValidationError::MissingEmail);
    }
    if !is_valid_email(&form.vendor_email) {
        return Err(ValidationError::InvalidEmail);
    }
    if is_blank(&form.business_name) {
        return Err(ValidationError::MissingBusinessName);
    }
    if is_blank(&form.business_description) {
        return Err(ValidationError::MissingBusinessDescription);
    }
    if form.product_categories.is_empty() {
        return Err(ValidationError::MissingCategories);
    }
    Ok(())
}
