mod assessment;
mod config;
mod credentials;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::credentials::prompt::TerminalPrompt;
use crate::credentials::{acquire_credential, Credential, ModelListValidator};
use crate::extraction::HttpDocumentExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Parser v{}", env!("CARGO_PKG_VERSION"));

    let credential = acquire_startup_credential(&config)?;
    // The startup runtime and its threads are gone; only this thread touches the environment.
    credential.export_to_env();
    info!("API key source: {:?}", credential.source());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(config, credential))
}

/// Runs key acquisition on a throwaway single-threaded runtime that is shut down
/// before returning. The listener is never bound without a working API key.
fn acquire_startup_credential(config: &Config) -> Result<Credential> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let validator = ModelListValidator::new(config.openai_base_url.clone());
    let mut prompt = TerminalPrompt::new();

    let result = runtime.block_on(acquire_credential(
        config.openai_api_key.as_deref(),
        &validator,
        &mut prompt,
    ));
    drop(runtime);

    match result {
        Ok(credential) => Ok(credential),
        Err(e) => {
            error!("API key acquisition failed: {e}");
            prompt.show_startup_hint()?;
            Err(e.into())
        }
    }
}

async fn serve(config: Config, credential: Credential) -> Result<()> {
    let llm = LlmClient::new(credential.secret().to_string(), config.openai_base_url.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let extractor = HttpDocumentExtractor::new(
        config.extraction_api_url.clone(),
        config.extraction_api_key.clone(),
    )?;
    info!("Extraction client initialized ({})", config.extraction_api_url);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let state = AppState {
        config,
        llm: Some(Arc::new(llm)),
        extractor: Arc::new(extractor),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
