mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use wayfind_agent::usecases::geocode::GeocodeContext;
use wayfind_agent::{Collaborators, InMemoryStore, Orchestrator, OrchestratorSettings};
use wayfind_classify::{LlmClient, QueryClassifier, TextGenerator};
use wayfind_core::categories::{load_category_table, CategoryTable};
use wayfind_core::{AppConfig, Location};
use wayfind_places::{GeocodeClient, PoiClient};
use wayfind_routing::RoutingClient;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = wayfind_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(config = ?config, "starting wayfind server");

    let orchestrator = Arc::new(build_orchestrator(&config)?);
    let app = build_app(AppState { orchestrator });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let table = match &config.categories_path {
        Some(path) => load_category_table(path)?,
        None => CategoryTable::builtin(),
    };

    let generator: Option<Arc<dyn TextGenerator>> = if config.llm_enabled {
        Some(Arc::new(LlmClient::new(
            &config.llm_base_url,
            config.llm_api_key.as_deref(),
            &config.llm_model,
            config.light_timeout_secs,
        )?))
    } else {
        tracing::warn!("LLM classification disabled; rule engine only");
        None
    };
    let classifier = QueryClassifier::new(generator, Arc::new(table));

    let collaborators = Collaborators {
        routing: RoutingClient::with_base_url(
            config.routing_api_key.as_deref(),
            config.heavy_timeout_secs,
            &config.user_agent,
            &config.routing_base_url,
        )?,
        pois: PoiClient::new(
            &config.overpass_base_url,
            config.heavy_timeout_secs,
            &config.user_agent,
        )?,
        geocoder: GeocodeClient::new(
            &config.nominatim_base_url,
            config.light_timeout_secs,
            &config.user_agent,
        )?,
    };

    let settings = OrchestratorSettings {
        fallback_location: Location::named(
            config.fallback_lat,
            config.fallback_lng,
            format!("{}, {}", config.default_city, config.default_state),
        ),
        geocode: GeocodeContext {
            city: config.default_city.clone(),
            state: config.default_state.clone(),
            country_code: config.geocode_country.clone(),
        },
    };

    Ok(Orchestrator::new(
        classifier,
        collaborators,
        Arc::new(InMemoryStore::new()),
        settings,
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
