//! Form validation for seller-submitted data.

use catalog_data::{SellerProfile, SellerRegistration};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use store::{DraftProblem, ProductDraft};

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-\s()]+$").expect("phone pattern compiles"));
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern compiles"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const BUSINESS_NAME_CHARS: std::ops::RangeInclusive<usize> = 2..=100;
const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=50;

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DraftProblem> for FieldError {
    fn from(problem: DraftProblem) -> Self {
        Self::new(problem.field, problem.message)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check a profile edit and return it normalized: names and optional fields
/// trimmed, blank optional fields cleared.
pub fn validate_profile(profile: SellerProfile) -> Result<SellerProfile, Vec<FieldError>> {
    let mut errors = Vec::new();
    let profile = check_profile(profile, &mut errors);
    if errors.is_empty() { Ok(profile) } else { Err(errors) }
}

/// Check a registration and return it normalized. The email is lowercased;
/// uniqueness is left to the store.
pub fn validate_registration(
    registration: SellerRegistration,
) -> Result<SellerRegistration, Vec<FieldError>> {
    let username = registration.username.trim().to_string();
    let email = registration.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if !USERNAME_CHARS.contains(&username.chars().count()) {
        errors.push(FieldError::new(
            "username",
            "Username must be between 3 and 50 characters",
        ));
    }
    if !username.is_empty() && !USERNAME.is_match(&username) {
        errors.push(FieldError::new(
            "username",
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    if !EMAIL.is_match(&email) {
        errors.push(FieldError::new(
            "email",
            "Please provide a valid email address",
        ));
    }
    let profile = check_profile(registration.profile(), &mut errors);

    if errors.is_empty() {
        Ok(SellerRegistration {
            username,
            email,
            business_name: profile.business_name,
            phone: profile.phone,
            address: profile.address,
        })
    } else {
        Err(errors)
    }
}

fn check_profile(profile: SellerProfile, errors: &mut Vec<FieldError>) -> SellerProfile {
    let business_name = profile.business_name.trim().to_string();
    let phone = trimmed(profile.phone);
    let address = trimmed(profile.address);

    if !BUSINESS_NAME_CHARS.contains(&business_name.chars().count()) {
        errors.push(FieldError::new(
            "businessName",
            "Business name must be between 2 and 100 characters",
        ));
    }
    if phone.as_deref().is_some_and(|p| !PHONE.is_match(p)) {
        errors.push(FieldError::new(
            "phone",
            "Please provide a valid phone number",
        ));
    }

    SellerProfile {
        business_name,
        phone,
        address,
    }
}

pub fn validate_draft(draft: &ProductDraft) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = draft.validate().into_iter().map(FieldError::from).collect();
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, phone: Option<&str>) -> SellerProfile {
        SellerProfile {
            business_name: name.to_string(),
            phone: phone.map(str::to_string),
            address: Some("  Bonapriso, Douala ".to_string()),
        }
    }

    #[test]
    fn test_valid_profile_is_normalized() {
        let clean = validate_profile(profile("  Douala Gadgets ", Some("+237 (6) 99-00"))).unwrap();
        assert_eq!(clean.business_name, "Douala Gadgets");
        assert_eq!(clean.phone.as_deref(), Some("+237 (6) 99-00"));
        assert_eq!(clean.address.as_deref(), Some("Bonapriso, Douala"));
    }

    #[test]
    fn test_business_name_length() {
        let errors = validate_profile(profile(" A ", None)).unwrap_err();
        assert_eq!(errors[0].field, "businessName");

        assert!(validate_profile(profile(&"x".repeat(100), None)).is_ok());
        assert!(validate_profile(profile(&"x".repeat(101), None)).is_err());
    }

    #[test]
    fn test_phone_pattern() {
        let errors = validate_profile(profile("Yaounde Audio", Some("call me"))).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("phone", "Please provide a valid phone number")]);

        let blank = validate_profile(profile("Yaounde Audio", Some("   "))).unwrap();
        assert_eq!(blank.phone, None);
    }

    #[test]
    fn test_collects_every_error() {
        let errors = validate_profile(profile("", Some("abc"))).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["businessName", "phone"]);
    }

    fn registration(username: &str, email: &str) -> SellerRegistration {
        SellerRegistration {
            username: username.to_string(),
            email: email.to_string(),
            business_name: "Buea Phones".to_string(),
            phone: None,
            address: None,
        }
    }

    #[test]
    fn test_valid_registration_is_normalized() {
        let clean = validate_registration(registration(" buea_phones ", " Sales@BueaPhones.CM ")).unwrap();
        assert_eq!(clean.username, "buea_phones");
        assert_eq!(clean.email, "sales@bueaphones.cm");
        assert_eq!(clean.business_name, "Buea Phones");
    }

    #[test]
    fn test_registration_username_rules() {
        let errors = validate_registration(registration("ab", "a@b.cm")).unwrap_err();
        assert_eq!(errors[0].message, "Username must be between 3 and 50 characters");

        let errors = validate_registration(registration("buea phones!", "a@b.cm")).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new(
                "username",
                "Username can only contain letters, numbers, and underscores"
            )]
        );

        assert!(validate_registration(registration(&"u".repeat(50), "a@b.cm")).is_ok());
        assert!(validate_registration(registration(&"u".repeat(51), "a@b.cm")).is_err());
    }

    #[test]
    fn test_registration_collects_every_error() {
        let mut bad = registration("", "not-an-email");
        bad.business_name = "B".to_string();
        bad.phone = Some("call me".to_string());

        let errors = validate_registration(bad).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["username", "email", "businessName", "phone"]);
    }

    #[test]
    fn test_draft_problems_become_field_errors() {
        let errors = validate_draft(&ProductDraft::new(" ", "Phones", -1.0)).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "price"]);

        assert!(validate_draft(&ProductDraft::new("Pixel 8", "Phones", 699.0)).is_ok());
    }
}
