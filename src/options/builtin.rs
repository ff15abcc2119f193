use super::OptionSetConfig;
use crate::domain::FieldOption;

fn set(name: &str, description: &str, entries: &[(&str, &str)]) -> OptionSetConfig {
    OptionSetConfig {
        name: name.to_string(),
        description: Some(description.to_string()),
        options: entries
            .iter()
            .map(|(value, label)| FieldOption::new(*value, *label))
            .collect(),
    }
}

/// Option sets available without any configuration
pub fn builtin_option_sets() -> Vec<OptionSetConfig> {
    vec![
        set(
            "countries",
            "ISO 3166-1 alpha-2 countries",
            &[
                ("AU", "Australia"),
                ("BR", "Brazil"),
                ("CA", "Canada"),
                ("CN", "China"),
                ("DE", "Germany"),
                ("ES", "Spain"),
                ("FR", "France"),
                ("GB", "United Kingdom"),
                ("GH", "Ghana"),
                ("IE", "Ireland"),
                ("IN", "India"),
                ("IT", "Italy"),
                ("JP", "Japan"),
                ("KE", "Kenya"),
                ("MX", "Mexico"),
                ("NG", "Nigeria"),
                ("NL", "Netherlands"),
                ("NZ", "New Zealand"),
                ("SE", "Sweden"),
                ("SG", "Singapore"),
                ("US", "United States"),
                ("ZA", "South Africa"),
            ],
        ),
        set(
            "currencies",
            "ISO 4217 currencies",
            &[
                ("AUD", "Australian Dollar"),
                ("CAD", "Canadian Dollar"),
                ("CHF", "Swiss Franc"),
                ("CNY", "Chinese Yuan"),
                ("EUR", "Euro"),
                ("GBP", "British Pound"),
                ("INR", "Indian Rupee"),
                ("JPY", "Japanese Yen"),
                ("NGN", "Nigerian Naira"),
                ("USD", "US Dollar"),
            ],
        ),
        set(
            "us_states",
            "United States states",
            &[
                ("AZ", "Arizona"),
                ("CA", "California"),
                ("CO", "Colorado"),
                ("FL", "Florida"),
                ("GA", "Georgia"),
                ("IL", "Illinois"),
                ("MA", "Massachusetts"),
                ("NY", "New York"),
                ("OR", "Oregon"),
                ("PA", "Pennsylvania"),
                ("TX", "Texas"),
                ("WA", "Washington"),
            ],
        ),
        set("yes_no", "Binary choice", &[("yes", "Yes"), ("no", "No")]),
        set(
            "languages",
            "Common languages",
            &[
                ("de", "German"),
                ("en", "English"),
                ("es", "Spanish"),
                ("fr", "French"),
                ("hi", "Hindi"),
                ("ja", "Japanese"),
                ("pt", "Portuguese"),
                ("zh", "Chinese"),
            ],
        ),
        set(
            "timezones",
            "Common IANA time zones",
            &[
                ("UTC", "UTC"),
                ("America/New_York", "Eastern Time"),
                ("America/Chicago", "Central Time"),
                ("America/Denver", "Mountain Time"),
                ("America/Los_Angeles", "Pacific Time"),
                ("Europe/London", "London"),
                ("Europe/Berlin", "Berlin"),
                ("Africa/Lagos", "Lagos"),
                ("Asia/Kolkata", "India"),
                ("Asia/Tokyo", "Tokyo"),
            ],
        ),
    ]
}
