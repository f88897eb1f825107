//! One-shot command line front end for the query pipeline.
//!
//! `query` runs the full orchestration; `classify` prints the two-stage
//! classification for debugging; `geocode` and `route` exercise the
//! corresponding collaborators directly.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use wayfind_agent::usecases::geocode::{geocode_with_fallbacks, GeocodeContext};
use wayfind_agent::usecases::route::{get_route, RouteRequest};
use wayfind_agent::{
    Collaborators, InMemoryStore, Orchestrator, OrchestratorRequest, OrchestratorSettings,
};
use wayfind_classify::{LlmClient, QueryClassifier, TextGenerator};
use wayfind_core::categories::{load_category_table, CategoryTable};
use wayfind_core::{AppConfig, Location, TransportMode};
use wayfind_places::{GeocodeClient, PoiClient};
use wayfind_routing::RoutingClient;

#[derive(Debug, Parser)]
#[command(name = "wayfind-cli")]
#[command(about = "Natural-language place search from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full query through classification and the agents.
    Query {
        text: String,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lng: Option<f64>,
        #[arg(long, default_value = "cli-user")]
        user: String,
        /// Skip memory read/write for this invocation.
        #[arg(long)]
        no_memory: bool,
    },
    /// Classify a query and print the result without executing it.
    Classify { text: String },
    /// Resolve free text to coordinates.
    Geocode { text: String },
    /// Compute the best direct route between two points.
    Route {
        #[arg(long)]
        from_lat: f64,
        #[arg(long)]
        from_lng: f64,
        #[arg(long)]
        to_lat: f64,
        #[arg(long)]
        to_lng: f64,
        #[arg(long, default_value = "driving")]
        mode: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = wayfind_core::load_app_config()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            text,
            lat,
            lng,
            user,
            no_memory,
        } => {
            let orchestrator = build_orchestrator(&config)?;
            let user_location = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(Location::new(lat, lng)),
                _ => None,
            };
            let response = orchestrator
                .handle(OrchestratorRequest {
                    query: text,
                    user_id: user,
                    user_location,
                    conversation_history: Vec::new(),
                    memory_enabled: !no_memory,
                })
                .await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Classify { text } => {
            let classifier = build_classifier(&config)?;
            let classification = classifier.classify(&text, &[]).await;
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        Commands::Geocode { text } => {
            let geocoder = GeocodeClient::new(
                &config.nominatim_base_url,
                config.light_timeout_secs,
                &config.user_agent,
            )?;
            let context = geocode_context(&config);
            match geocode_with_fallbacks(&geocoder, &text, &context).await {
                Ok(output) => println!("{}", serde_json::to_string_pretty(&output.data)?),
                Err(e) => {
                    eprintln!("geocoding failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Route {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
            mode,
        } => {
            let collaborators = build_collaborators(&config)?;
            let mode = parse_mode(&mode)?;
            match get_route(
                &collaborators,
                &RouteRequest {
                    from: Location::new(from_lat, from_lng),
                    to: Location::new(to_lat, to_lng),
                    mode,
                },
            )
            .await
            {
                Ok(output) => {
                    let route = output.data;
                    println!(
                        "{:.1} km, {:.0} min ({} steps)",
                        route.distance_m / 1000.0,
                        route.duration_min,
                        route.steps.len()
                    );
                }
                Err(e) => {
                    eprintln!("routing failed: {}", e.message);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn parse_mode(raw: &str) -> anyhow::Result<TransportMode> {
    match raw {
        "walking" => Ok(TransportMode::Walking),
        "driving" => Ok(TransportMode::Driving),
        "cycling" => Ok(TransportMode::Cycling),
        "public_transport" => Ok(TransportMode::PublicTransport),
        other => anyhow::bail!("unknown transport mode: {other}"),
    }
}

fn geocode_context(config: &AppConfig) -> GeocodeContext {
    GeocodeContext {
        city: config.default_city.clone(),
        state: config.default_state.clone(),
        country_code: config.geocode_country.clone(),
    }
}

fn build_classifier(config: &AppConfig) -> anyhow::Result<QueryClassifier> {
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
        None
    };
    Ok(QueryClassifier::new(generator, Arc::new(table)))
}

fn build_collaborators(config: &AppConfig) -> anyhow::Result<Collaborators> {
    Ok(Collaborators {
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
    })
}

fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let settings = OrchestratorSettings {
        fallback_location: Location::named(
            config.fallback_lat,
            config.fallback_lng,
            format!("{}, {}", config.default_city, config.default_state),
        ),
        geocode: geocode_context(config),
    };
    Ok(Orchestrator::new(
        build_classifier(config)?,
        build_collaborators(config)?,
        Arc::new(InMemoryStore::new()),
        settings,
    ))
}
