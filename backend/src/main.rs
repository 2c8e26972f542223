//! Binary entry point.

use backend::server::{self, ServerConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    // Structured logs for collectors, human-readable ones everywhere else.
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();
    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;
    server::run(config).await
}
