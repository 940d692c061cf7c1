use axum::{
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::middleware::{logging_middleware, require_auth};
use super::recipes;
use super::state::AppState;

/// Create the full router with application state
///
/// Writes to `/recipes` always pass through the configured gate; the plain
/// listing does so only when `protect_list` is set.
pub fn create_router_with_state(state: AppState, protect_list: bool) -> Router {
    let gated = |route: MethodRouter<AppState>| {
        route.route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
    };

    let list = if protect_list {
        gated(get(recipes::list_recipes))
    } else {
        get(recipes::list_recipes)
    };

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .route("/recipes", list.merge(gated(post(recipes::create_recipe))))
        .route(
            "/recipes/{id}",
            gated(put(recipes::update_recipe)).merge(gated(delete(recipes::delete_recipe))),
        )
        .route("/recipes/search", get(recipes::search_recipes))
        .route("/recipes/search/{id}", get(recipes::get_recipe))
        .route("/signin", post(auth::sign_in))
        .route("/signup", post(auth::sign_up))
        .route("/refresh", post(auth::refresh))
        .route("/signout", post(auth::sign_out))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
