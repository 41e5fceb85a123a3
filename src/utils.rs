use std::sync::Once;

use tracing_subscriber::filter::{Directive, LevelFilter};

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber. `RUST_LOG` is honoured and
/// `default_directive` is layered on top; a directive that does not parse falls back
/// to `info`.
pub fn init_tracing(default_directive: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let directive = default_directive
            .parse::<Directive>()
            .unwrap_or_else(|_| LevelFilter::INFO.into());
        let filter = EnvFilter::from_default_env().add_directive(directive);

        fmt().with_env_filter(filter).init();
    });
}
