use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "fern=debug,fern_device=debug";

static INIT: Once = Once::new();

/// Install the global tracing subscriber, later calls are no-ops
///
/// `RUST_LOG` overrides the default filter, `log` records are forwarded to tracing
pub fn init() {
    INIT.call_once(|| {
        if let Err(error) = tracing_log::LogTracer::init() {
            eprintln!("unable to forward log records: {error}");
        }

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = tracing_subscriber::registry().with(filter).with(fmt::layer());
        if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("unable to set tracing subscriber: {error}");
        }
    });
}

mod ffi {
    #[uniffi::export]
    fn init_logging() {
        super::init();
    }
}
