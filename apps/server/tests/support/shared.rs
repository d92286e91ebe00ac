use cardvault::Config;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per test binary.
///
/// Set `RUST_LOG` to see logs; output goes through the test writer so it is
/// captured per test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Defaults for tests: in-memory storage, no config files or environment.
pub fn base_config() -> Config {
    let mut config = Config::default();
    config.database.in_memory = true;
    config.database.run_migrations = false;
    config
}
