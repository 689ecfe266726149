pub mod config;
pub mod game_loop;
pub mod stdin;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `SUMQUEST_LOG_FORMAT=json` switches to
/// JSON lines; the filter comes from `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("SUMQUEST_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
