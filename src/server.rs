use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::{require_admin, AuthSettings};
use crate::migration::Migrator;
use crate::store::SharedStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub migrator: Migrator,
}

impl AppState {
    pub fn new(store: SharedStore, legacy_collection: impl Into<String>) -> Self {
        Self {
            migrator: Migrator::new(store.clone(), legacy_collection),
            store,
        }
    }
}

/// Router options that come from configuration
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub auth: AuthSettings,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
    /// `None` disables CORS entirely
    pub cors_origins: Option<Vec<String>>,
}

impl ServerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            auth: AuthSettings::from_config(config),
            max_request_size_bytes: config.api.max_request_size_bytes,
            enable_request_logging: config.api.enable_request_logging,
            cors_origins: config
                .security
                .enable_cors
                .then(|| config.security.cors_origins.clone()),
        }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            auth: AuthSettings::presence_only(),
            max_request_size_bytes: 1024 * 1024,
            enable_request_logging: false,
            cors_origins: None,
        }
    }
}

pub fn app(state: AppState, options: ServerOptions) -> Router {
    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(migration_routes(&options.auth))
        .merge(content_routes(&options.auth))
        .with_state(state)
        .layer(DefaultBodyLimit::max(options.max_request_size_bytes));

    if let Some(origins) = &options.cors_origins {
        router = router.layer(cors_layer(origins));
    }
    if options.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn migration_routes(auth: &AuthSettings) -> Router<AppState> {
    let admin = from_fn_with_state(auth.clone(), require_admin);

    Router::new().route(
        "/api/migration",
        get(public::migration_status).post(protected::migration_trigger.layer(admin)),
    )
}

fn content_routes(auth: &AuthSettings) -> Router<AppState> {
    let admin = from_fn_with_state(auth.clone(), require_admin);

    Router::new()
        .route("/api/life-paths", get(public::life_paths_list))
        .route(
            "/api/life-paths/:code",
            get(public::life_path_get)
                .put(protected::life_path_put.layer(admin.clone()))
                .delete(protected::life_path_delete.layer(admin.clone())),
        )
        .route("/api/zodiacs", get(public::zodiacs_list))
        .route(
            "/api/zodiacs/:code",
            get(public::zodiac_get)
                .put(protected::zodiac_put.layer(admin.clone()))
                .delete(protected::zodiac_delete.layer(admin)),
        )
        .route("/api/compatibility/:pair", get(public::compatibility_list))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}
