mod routes;

use std::sync::Arc;

use plainlaw_agent::client_from_config;
use plainlaw_core::{analysis::DocumentAnalyzer, completion::CompletionClient, config::Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "plainlaw_server=info,plainlaw_core=info,plainlaw_agent=info,tower_http=debug";

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub analyzer: DocumentAnalyzer,
    /// Same client the analyzer uses; kept for the completion probe.
    pub client: Arc<dyn CompletionClient>,
}

// ── main ──────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let client = client_from_config(&config)?;
    let analyzer = DocumentAnalyzer::with_client(Arc::clone(&client), config.simplifier_settings())?;

    info!(
        backend = %config.backend,
        max_chunk_chars = config.max_chunk_chars,
        retry_attempts = config.retry_attempts,
        "completion backend ready"
    );

    let state = Arc::new(AppState { analyzer, client });
    let app = routes::router(state, config.max_body_bytes);

    let addr = format!("{}:{}", config.web_bind, config.web_port);
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
