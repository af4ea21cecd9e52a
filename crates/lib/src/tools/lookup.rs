//! Static reference data for the placeholder citizen services.

/// Scheme key (lowercase) → description.
const SCHEMES: &[(&str, &str)] = &[
    (
        "pmay",
        "Pradhan Mantri Awas Yojana is a scheme by the Government of India to provide affordable housing to the urban poor.",
    ),
    (
        "ayushman_bharat",
        "Ayushman Bharat is a health scheme aimed at providing free health coverage to low-income earners in India.",
    ),
];

/// Application id (uppercase) → status.
const APPLICATION_STATUSES: &[(&str, &str)] = &[
    ("APP1234", "Your application is currently under review."),
    ("APP5678", "Your application has been approved."),
    ("APP9876", "Your application is pending further documentation."),
];

pub const SCHEME_NOT_FOUND: &str = "Scheme information not available.";
pub const APPLICATION_NOT_FOUND: &str = "Application ID not found.";

/// Case-insensitive scheme lookup.
pub fn scheme_info(scheme_name: &str) -> Option<&'static str> {
    let key = scheme_name.trim().to_lowercase();
    SCHEMES.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Case-insensitive application status lookup.
pub fn application_status(application_id: &str) -> Option<&'static str> {
    let key = application_id.trim().to_uppercase();
    APPLICATION_STATUSES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}
