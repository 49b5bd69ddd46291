use clap::Parser;
use std::time::Duration;

use crate::auth::DEFAULT_REGION;

use super::parsers::{parse_duration_arg, parse_header};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Obtain an identity service token from EC2 credentials, or hammer the ec2tokens endpoint with concurrent authentications."
)]
pub struct AuthArgs {
    /// Identity service auth URL
    #[arg(long = "auth-url", env = "OS_AUTH_URL")]
    pub auth_url: Option<String>,

    /// EC2 access key
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access: Option<String>,

    /// EC2 secret key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret: Option<String>,

    /// Run an infinite loop with this many concurrent attempts (0 = authenticate once)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Log HTTP traffic and identity details
    #[arg(long)]
    pub debug: bool,

    /// Skip server TLS certificate verification
    #[arg(long = "insecure-tls")]
    pub insecure_tls: bool,

    /// Override the Host header sent to the identity service
    #[arg(long)]
    pub host: Option<String>,

    /// Tally failures by error type in continuous mode
    #[arg(long = "show-error")]
    pub show_error: bool,

    /// Retries after a connection error before giving up
    #[arg(long = "max-retries", default_value_t = 0)]
    pub max_retries: usize,

    /// Stop retrying once this much time has passed (supports ms/s/m/h)
    #[arg(long = "retry-budget", value_parser = parse_duration_arg)]
    pub retry_budget: Option<Duration>,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long, default_value = "9s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Connect timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Extra request headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Header whose value is masked in logs (repeatable, replaces the default set)
    #[arg(long = "sensitive-header")]
    pub sensitive_headers: Vec<String>,

    /// Region used in the signature scope
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Path to config file (TOML or JSON)
    #[arg(long)]
    pub config: Option<String>,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
