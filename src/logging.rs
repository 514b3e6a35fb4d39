use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

lazy_static::lazy_static! {
    static ref LOG_TARGET: String = env!("CARGO_CRATE_NAME").to_string();
}

/// `RUST_LOG` wins; otherwise this crate logs at `info`, or `debug` when verbose.
fn env_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", *LOG_TARGET)))
}

pub fn log_init(verbose: bool) -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(env_filter(verbose)))
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;

    Ok(())
}
