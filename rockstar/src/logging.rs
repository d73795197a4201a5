//! Tracing setup

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Environment variable checked first for the log filter
pub const LOG_ENV: &str = "ROCKSTAR_LOG";

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `ROCKSTAR_LOG` or
/// `RUST_LOG` is set, e.g. `ROCKSTAR_LOG=rockstar=trace` to log every
/// executed statement.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = match std::env::var(LOG_ENV) {
            Ok(directives) => EnvFilter::new(directives),
            Err(_) if std::env::var("RUST_LOG").is_ok() => EnvFilter::from_default_env(),
            Err(_) => return,
        };
        // Another subscriber may already be installed by the host
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        init_tracing();
        assert!(TRACING_INIT.is_completed());
    }
}
