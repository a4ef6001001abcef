//! Lumen command-line driver.
//!
//! The binary (`lumen`) is a thin argument dispatcher over [`commands`].
//! Each command has a `*_source` form that works on text and returns its
//! report, which the end-to-end tests use, and a `*_file` form that reads
//! a file, prints, and exits nonzero on failure.

pub mod commands;
pub mod render;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber if `RUST_LOG` is set.
///
/// Enable with e.g. `RUST_LOG=lumen_eval=debug` or `RUST_LOG=lumen_types=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
