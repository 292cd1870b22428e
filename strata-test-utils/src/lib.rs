//! Shared fixtures for strata tests and benches.
//!
//! The operator under test consumes a storage scan and a codec through
//! traits; this crate supplies working in-memory stand-ins for both, plus a
//! tracing initializer for test binaries. Nothing here is a production
//! codec: [`PlainCodec`] is a trivially decodable tagged encoding that
//! exists so tests can exercise the decode state machines.

use std::sync::Once;

pub mod plain;
pub mod scan;

pub use plain::{PlainCodec, encode_values};
pub use scan::{VecScan, absent_cell, carrier_row, int_batch, segment_cell, stream_cell};

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let env = std::env::var("RUST_LOG").ok();
        let filter = match env {
            Some(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            None => EnvFilter::new("info"),
        };
        fmt().with_env_filter(filter).with_target(false).init();
    });
}
