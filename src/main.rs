mod config;
mod db;
mod error;
mod routes;
mod state;
mod store;
mod tools;
mod webhook;

use std::process::ExitCode;
use std::sync::Arc;

use config::{Config, DatastoreConfig};
use store::LeadStore;
use store::postgres::PgLeadStore;
use store::supabase::SupabaseStore;
use webhook::WebhookClient;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "smartchat failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    config::load_dotenv()?;
    let config = Config::from_env()?;

    let store = build_store(&config).await?;
    let relay = Arc::new(WebhookClient::new(config.webhook_url.clone(), config.timeouts)?);
    tracing::info!(backend = config.datastore.backend_name(), "datastore initialized");

    let state = state::AppState::new(store, relay);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "smartchat listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn LeadStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn LeadStore> = match &config.datastore {
        DatastoreConfig::Postgres { database_url, max_connections } => {
            let pool = db::init_pool(database_url, *max_connections, config.timeouts.request()).await?;
            Arc::new(PgLeadStore::new(pool, config.timeouts.request()))
        }
        DatastoreConfig::Rest { base_url, api_key } => {
            Arc::new(SupabaseStore::new(base_url, api_key.clone(), config.timeouts)?)
        }
    };
    Ok(store)
}
