use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. Events are written as flattened
/// JSON with file and line numbers so they can be shipped as-is. Calling this
/// twice is a no-op for the second call.
pub fn init_tracing(service_name: &str, log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .try_init();

    match result {
        Ok(()) => tracing::info!(service = %service_name, "Tracing initialized"),
        Err(e) => eprintln!(
            "Tracing already initialized for service '{}': {}",
            service_name, e
        ),
    }
}
