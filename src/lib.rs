pub mod auth;
pub mod config;
pub mod database;
pub mod dates;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

pub use error::ApiError;
pub use state::AppState;

use config::SecurityConfig;
use handlers::{protected, public};
use middleware::{access_guard, role_guard, AllowedRoles};

/// Full application router
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .route("/api/health", get(public::health::health))
        .merge(auth_routes(&state))
        .merge(journey_routes(&state))
        .merge(chat_routes(&state))
        .with_state(state)
        // Multipart bodies carry up to `max_files` uploads; the per-file cap is enforced while parsing
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.upload.max_body_bytes()));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Requires a valid bearer token
fn authenticated(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route.layer(from_fn_with_state(state.clone(), access_guard))
}

/// Requires a valid bearer token and one of `roles`
fn restricted(route: MethodRouter<AppState>, roles: AllowedRoles, state: &AppState) -> MethodRouter<AppState> {
    authenticated(route.layer(from_fn_with_state(roles, role_guard)), state)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/auth/me", authenticated(get(protected::auth::me), state))
}

fn journey_routes(state: &AppState) -> Router<AppState> {
    use protected::journeys;

    Router::new()
        .route(
            "/api/journeys",
            get(public::journeys::list).merge(restricted(post(journeys::create), AllowedRoles::TRAVELER, state)),
        )
        .route(
            "/api/journeys/my-journeys",
            restricted(get(journeys::mine), AllowedRoles::TRAVELER, state),
        )
        .route("/api/journeys/save", restricted(post(journeys::save), AllowedRoles::SEEKER, state))
        .route("/api/journeys/unsave", restricted(post(journeys::unsave), AllowedRoles::SEEKER, state))
        .route("/api/journeys/saved/all", restricted(get(journeys::saved), AllowedRoles::SEEKER, state))
        .route("/api/journeys/viewed/count", authenticated(get(journeys::viewed_count), state))
        .route(
            "/api/journeys/:id",
            get(public::journeys::get).merge(restricted(
                put(journeys::update).merge(delete(journeys::delete)),
                AllowedRoles::TRAVELER,
                state,
            )),
        )
}

fn chat_routes(state: &AppState) -> Router<AppState> {
    use protected::chats;

    Router::new()
        .route("/api/chats", authenticated(get(chats::list).post(chats::create), state))
        .route("/api/chats/:id", authenticated(get(chats::get), state))
        .route("/api/chats/:id/message", authenticated(post(chats::send), state))
}

/// Explicit origins when configured, otherwise any origin
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
