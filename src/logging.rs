use once_cell::sync::Lazy;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGING: Lazy<()> = Lazy::new(|| {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  let _ = fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
});

/// Install the stderr subscriber once; `RUST_LOG` overrides the default `warn` filter.
pub fn init() {
  Lazy::force(&LOGGING);
}
