//! Tracing initialization for binaries and tests.
//!
//! Library users that install their own subscriber are left alone: `init`
//! is guarded and falls back silently when a global subscriber exists.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static INIT_GUARD: OnceLock<()> = OnceLock::new();

/// Initialize structured logging.
///
/// `RUST_LOG` wins when set; otherwise the default level is `info` when
/// `APPROVALFLOW_ENV` (or `APP_ENV`) is `production` and `debug` everywhere
/// else.
pub fn init_structured_logging() {
    INIT_GUARD.get_or_init(|| {
        let directive = default_directive();
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter),
        );

        // try_init so a subscriber installed by the host application wins
        if subscriber.try_init().is_ok() {
            tracing::info!(directive, "structured logging initialized");
        }
    });
}

fn default_directive() -> &'static str {
    let environment = std::env::var("APPROVALFLOW_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_default();
    if environment == "production" {
        "info"
    } else {
        "debug"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging();
        assert!(INIT_GUARD.get().is_some());
    }
}
