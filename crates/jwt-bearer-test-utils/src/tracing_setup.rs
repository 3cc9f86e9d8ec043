//! Tracing subscriber for tests.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a test subscriber once per process.
///
/// Output goes through the libtest capture so it only shows for failing
/// tests. `RUST_LOG` overrides the default `jwt_bearer=debug` filter.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwt_bearer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
