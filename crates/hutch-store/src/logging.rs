use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "hutch_store=info,hutch_db=info,hutch_health=info";

/// Install a fmt subscriber filtered by `RUST_LOG`. Safe to call more than
/// once; later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .try_init();
}
