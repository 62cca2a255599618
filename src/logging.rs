use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::FormConfig;

/// Install the fmt subscriber for `config.log_filter`, falling back to `info`
/// when the filter does not parse. Returns false if a subscriber was already
/// installed.
pub fn init_tracing(config: &FormConfig) -> bool {
    let env_filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
}

pub fn init_test_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}
