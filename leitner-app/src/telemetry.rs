//! tracing-subscriber setup.
//!
//! `LOG_LEVEL` (or `RUST_LOG`) holds the filter directives; `LOG_FORMAT=json`
//! switches to structured JSON lines.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,leitner_app=debug,leitner_core=info,tower_http=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
