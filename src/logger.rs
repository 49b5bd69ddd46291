use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when `--debug` is set and no filter variable is present.
/// Only this crate's events are raised to debug; the HTTP stack stays at info.
const DEBUG_FILTER: &str = "info,ec2auth=debug";

pub fn init_logging(debug: bool, no_color: bool) {
    let filter = std::env::var("EC2AUTH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if debug {
                    EnvFilter::new(DEBUG_FILTER)
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false, true);
        init_logging(true, true);
    }
}
