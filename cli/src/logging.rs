use anyhow::Context;
use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the stderr subscriber. `RUST_LOG` wins over the flag-derived
/// level, which is `warn` unless `--verbose` was given. Fails if a global
/// subscriber is already set.
pub fn init_subscriber(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(verbose)
        .without_time()
        .compact();
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_existing_subscriber() {
        init_subscriber(false).expect("first install");
        let err = init_subscriber(true).expect_err("subscriber already installed");
        assert!(err.to_string().contains("failed to install tracing subscriber"));
    }
}
