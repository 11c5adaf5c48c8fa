use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "follow_seed=info";

/// Install the global tracing subscriber.
///
/// `verbose` raises the default filter to debug; an explicit `RUST_LOG`
/// always wins.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "follow_seed=debug" } else { DEFAULT_FILTER };

    // A second init (tests, repeated calls) leaves the first subscriber in place
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();
}
