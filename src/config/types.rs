use std::time::Duration;

use serde::Deserialize;

use crate::error::AppResult;

/// Settings file mirroring the CLI flags in snake_case.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub auth_url: Option<String>,
    pub access: Option<String>,
    pub secret: Option<String>,
    pub threads: Option<usize>,
    pub debug: Option<bool>,
    pub insecure_tls: Option<bool>,
    pub host: Option<String>,
    pub show_error: Option<bool>,
    pub max_retries: Option<usize>,
    pub retry_budget: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub headers: Option<Vec<String>>,
    pub sensitive_headers: Option<Vec<String>>,
    pub region: Option<String>,
    pub no_color: Option<bool>,
}

/// Whole seconds, or a string with an `ms`/`s`/`m`/`h` suffix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, field: &'static str) -> AppResult<Duration> {
        match self {
            DurationValue::Seconds(secs) => super::parse_duration_value(field, &secs.to_string()),
            DurationValue::Text(text) => super::parse_duration_value(field, text),
        }
    }
}
