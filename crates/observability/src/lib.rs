//! Process-wide tracing setup shared by the admin binaries.

/// Subscriber installation (JSON output, `RUST_LOG` filtering).
pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, init, init_with_default};
