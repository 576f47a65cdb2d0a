//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with an explicit filter string (e.g. `"physics_query=debug"`)
///
/// `RUST_LOG` still wins when set. Returns `false` if a logger was already installed,
/// which is the normal case when several tests share one process.
pub fn init_with_filter(filter: &str) -> bool {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filter);
    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&env_filter);
    }
    builder.try_init().is_ok()
}
