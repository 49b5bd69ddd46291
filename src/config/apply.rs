use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{AuthArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Fills every setting not given on the command line or through its
/// environment variable from the config file.
///
/// # Errors
///
/// Returns an error when a header or duration in the file is invalid.
pub fn apply_config(args: &mut AuthArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_explicit(matches, "auth_url")
        && let Some(auth_url) = config.auth_url.clone()
    {
        args.auth_url = Some(auth_url);
    }

    if !is_explicit(matches, "access")
        && let Some(access) = config.access.clone()
    {
        args.access = Some(access);
    }

    if !is_explicit(matches, "secret")
        && let Some(secret) = config.secret.clone()
    {
        args.secret = Some(secret);
    }

    if !is_explicit(matches, "threads")
        && let Some(threads) = config.threads
    {
        args.threads = threads;
    }

    if !is_explicit(matches, "debug")
        && let Some(debug) = config.debug
    {
        args.debug = debug;
    }

    if !is_explicit(matches, "insecure_tls")
        && let Some(insecure_tls) = config.insecure_tls
    {
        args.insecure_tls = insecure_tls;
    }

    if !is_explicit(matches, "host")
        && let Some(host) = config.host.clone()
    {
        args.host = Some(host);
    }

    if !is_explicit(matches, "show_error")
        && let Some(show_error) = config.show_error
    {
        args.show_error = show_error;
    }

    if !is_explicit(matches, "max_retries")
        && let Some(max_retries) = config.max_retries
    {
        args.max_retries = max_retries;
    }

    if !is_explicit(matches, "retry_budget")
        && let Some(budget) = config.retry_budget.as_ref()
    {
        args.retry_budget = Some(budget.to_duration("retry_budget")?);
    }

    if !is_explicit(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.timeout = timeout.to_duration("timeout")?;
    }

    if !is_explicit(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout.to_duration("connect_timeout")?;
    }

    if !is_explicit(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|source| AppError::config(ConfigError::InvalidHeader { source }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_explicit(matches, "sensitive_headers")
        && let Some(names) = config.sensitive_headers.clone()
    {
        args.sensitive_headers = names;
    }

    if !is_explicit(matches, "region")
        && let Some(region) = config.region.clone()
    {
        args.region = region;
    }

    if !is_explicit(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
