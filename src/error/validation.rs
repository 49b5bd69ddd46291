use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please define --auth-url parameter or OS_AUTH_URL environment variable")]
    MissingAuthUrl,
    #[error("Please define --access parameter or AWS_ACCESS_KEY_ID environment variable")]
    MissingAccess,
    #[error("Please define --secret parameter or AWS_SECRET_ACCESS_KEY environment variable")]
    MissingSecret,
    #[error("{count} required settings are missing")]
    MissingSettings { count: usize },
    #[error("Invalid header format '{value}'. Expected 'Key: Value'.")]
    InvalidHeaderFormat { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
}
