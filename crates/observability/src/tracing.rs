//! JSON tracing subscriber with an `EnvFilter`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Install the subscriber with [`DEFAULT_FILTER`].
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Install the subscriber, falling back to `default_filter` when `RUST_LOG`
/// does not yield a filter. Returns `false` if a global subscriber was
/// already set.
pub fn init_with_default(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(default_filter, "tracing subscriber installed");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_noop() {
        init_with_default("debug");
        assert!(!init_with_default(DEFAULT_FILTER));
    }
}
