use std::time::Duration;

use crate::args::parse_duration;
use crate::error::{AppError, AppResult, ConfigError};

pub(crate) fn parse_duration_value(field: &'static str, value: &str) -> AppResult<Duration> {
    parse_duration(value)
        .map_err(|source| AppError::config(ConfigError::InvalidDuration { field, source }))
}
