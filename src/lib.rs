pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod storage;
pub mod types;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::state::AppState;

/// Full application router: public routes, the JWT-protected /api/v1 tree and global layers
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(user_routes())
        .merge(category_routes())
        .merge(tag_routes())
        .merge(document_routes())
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::jwt_auth_middleware,
        ));

    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .route("/api/v1/login", post(handlers::public::login_post))
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn user_routes() -> Router<AppState> {
    use handlers::protected::{roles, users};

    Router::new()
        .route("/api/v1/users", get(users::users_get).post(users::users_post))
        .route("/api/v1/users/me", get(users::me_get))
        .route("/api/v1/users/permissions", get(roles::permissions_get))
        .route("/api/v1/users/roles", get(roles::roles_get).post(roles::roles_post))
        .route(
            "/api/v1/users/roles/:id",
            get(roles::role_get)
                .put(roles::role_put)
                .delete(roles::role_delete),
        )
        .route(
            "/api/v1/users/:id",
            get(users::user_get)
                .put(users::user_put)
                .delete(users::user_delete),
        )
}

fn category_routes() -> Router<AppState> {
    use handlers::protected::categories;

    Router::new()
        .route(
            "/api/v1/categories",
            get(categories::categories_get).post(categories::categories_post),
        )
        .route(
            "/api/v1/categories/sub-categories",
            get(categories::sub_categories_get).post(categories::sub_categories_post),
        )
        .route(
            "/api/v1/categories/sub-categories/:id",
            axum::routing::put(categories::sub_category_put).delete(categories::sub_category_delete),
        )
        .route(
            "/api/v1/categories/:id",
            get(categories::category_get)
                .put(categories::category_put)
                .delete(categories::category_delete),
        )
}

fn tag_routes() -> Router<AppState> {
    use handlers::protected::tags;

    Router::new()
        .route("/api/v1/tags", get(tags::tags_get).post(tags::tags_post))
        .route(
            "/api/v1/tags/:id",
            get(tags::tag_get).put(tags::tag_put).delete(tags::tag_delete),
        )
}

fn document_routes() -> Router<AppState> {
    use handlers::protected::documents;

    Router::new()
        .route(
            "/api/v1/documents",
            get(documents::documents_get).post(documents::documents_post),
        )
        .route("/api/v1/documents/my", get(documents::my_documents_get))
        .route("/api/v1/documents/history", get(documents::my_history_get))
        .route(
            "/api/v1/documents/:id",
            get(documents::document_get)
                .put(documents::document_put)
                .delete(documents::document_delete),
        )
        .route(
            "/api/v1/documents/:id/versions",
            get(documents::versions_get).post(documents::versions_post),
        )
        .route("/api/v1/documents/:id/download", get(documents::download_get))
        .route(
            "/api/v1/documents/:id/comments",
            get(documents::comments_get).post(documents::comments_post),
        )
        .route("/api/v1/documents/:id/history", get(documents::document_history_get))
}
