use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML override for the POI category synonym table.
    pub categories_path: Option<PathBuf>,
    pub routing_base_url: String,
    pub routing_api_key: Option<String>,
    pub overpass_base_url: String,
    pub nominatim_base_url: String,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_enabled: bool,
    /// Timeout for isochrone/directions/matrix/optimization calls.
    pub heavy_timeout_secs: u64,
    /// Timeout for geocoding and LLM classification calls.
    pub light_timeout_secs: u64,
    pub geocode_country: String,
    pub default_city: String,
    pub default_state: String,
    /// Substituted when a request carries no usable user location.
    pub fallback_lat: f64,
    pub fallback_lng: f64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("routing_base_url", &self.routing_base_url)
            .field(
                "routing_api_key",
                &self.routing_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("overpass_base_url", &self.overpass_base_url)
            .field("nominatim_base_url", &self.nominatim_base_url)
            .field("llm_base_url", &self.llm_base_url)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_enabled", &self.llm_enabled)
            .field("heavy_timeout_secs", &self.heavy_timeout_secs)
            .field("light_timeout_secs", &self.light_timeout_secs)
            .field("geocode_country", &self.geocode_country)
            .field("default_city", &self.default_city)
            .field("default_state", &self.default_state)
            .field("fallback_lat", &self.fallback_lat)
            .field("fallback_lng", &self.fallback_lng)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
