use std::ffi::OsString;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::error;

use ec2auth::args::AuthArgs;
use ec2auth::auth::{Credentials, Ec2TokenClient};
use ec2auth::config::{apply_config, load_config};
use ec2auth::error::{AppError, AppResult, ValidationError};
use ec2auth::harness::{LoadHarness, LoadMode, run_single};
use ec2auth::transport::{
    ClientSettings, HttpTransport, InstrumentedTransport, SensitiveHeaders, TrafficLogger,
    TransportConfig,
};

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    ec2auth::logger::init_logging(args.debug, args.no_color);

    let credentials = resolve_credentials(&args)?;
    let transport_config = build_transport_config(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args, credentials, transport_config))
}

fn parse_args() -> AppResult<(AuthArgs, ArgMatches)> {
    let raw_args: Vec<OsString> = std::env::args_os().collect();
    let matches = AuthArgs::command().get_matches_from(raw_args);
    let args = AuthArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

/// Collects every missing credential before failing so one run reports them
/// all.
fn resolve_credentials(args: &AuthArgs) -> AppResult<Credentials> {
    let present = |value: &Option<String>| value.clone().filter(|value| !value.trim().is_empty());
    let auth_url = present(&args.auth_url);
    let access = present(&args.access);
    let secret = present(&args.secret);

    let mut missing = Vec::with_capacity(3);
    if auth_url.is_none() {
        missing.push(ValidationError::MissingAuthUrl);
    }
    if access.is_none() {
        missing.push(ValidationError::MissingAccess);
    }
    if secret.is_none() {
        missing.push(ValidationError::MissingSecret);
    }

    match (auth_url, access, secret) {
        (Some(auth_url), Some(access), Some(secret)) => Ok(Credentials {
            access,
            secret,
            auth_url,
        }),
        _ => {
            for problem in &missing {
                error!("{}", problem);
            }
            let count = missing.len();
            match (missing.into_iter().next(), count) {
                (Some(only), 1) => Err(AppError::validation(only)),
                _ => Err(AppError::validation(ValidationError::MissingSettings {
                    count,
                })),
            }
        }
    }
}

fn build_transport_config(args: &AuthArgs) -> AppResult<TransportConfig> {
    let mut config = TransportConfig::default()
        .with_max_retries(args.max_retries)
        .with_retry_budget(args.retry_budget);

    if !args.sensitive_headers.is_empty() {
        config = config.with_sensitive_headers(SensitiveHeaders::new(
            args.sensitive_headers.iter().map(String::as_str),
        ));
    }
    for (name, value) in &args.headers {
        config = config.with_extra_header(name, value)?;
    }
    if let Some(host) = args.host.as_deref().filter(|host| !host.is_empty()) {
        config = config.with_host_override(host)?;
    }
    Ok(config)
}

async fn run_async(
    args: &AuthArgs,
    credentials: Credentials,
    transport_config: TransportConfig,
) -> AppResult<()> {
    let settings = ClientSettings {
        connect_timeout: args.connect_timeout,
        request_timeout: args.timeout,
        insecure_tls: args.insecure_tls,
    };
    let http = HttpTransport::new(&settings)?;
    let logger = args.debug.then_some(TrafficLogger);
    let transport = InstrumentedTransport::new(http, transport_config, logger);
    let client = Ec2TokenClient::new(transport, credentials, &args.region)?;

    match LoadMode::from_threads(args.threads) {
        LoadMode::Single => {
            let result = run_single(&client).await?;
            println!("{}", result.token_id);
            Ok(())
        }
        LoadMode::Continuous(threads) => {
            LoadHarness::new(Arc::new(client), threads, args.show_error)
                .run()
                .await;
            Ok(())
        }
    }
}
