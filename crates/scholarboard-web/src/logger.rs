//! Logging initialisation via tracing-subscriber.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence; `level` is the fallback when it is unset or
/// does not parse.
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log level '{level}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_succeeds_or_already_init() {
        match init("info") {
            Ok(()) => {}
            Err(e) if e.to_string().contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
