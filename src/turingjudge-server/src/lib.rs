//! HTTP surface of the TuringJudge game.

pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use routes::{AppState, router};

/// Initialize the tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,turingjudge_core=debug,turingjudge_server=debug,tower_http=debug")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
