use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Installs the global structured logger.
///
/// `RUST_LOG` directives win when present; otherwise the crate logs at
/// `config.rust_log`. Returns an error if a subscriber is already installed.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!("Career Companion client v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
