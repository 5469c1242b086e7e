use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    AppState,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit},
    routes::{self, auth, user, wh},
};

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(user::create_user).get(user::get_current_user))
        .route("/user/list", get(user::list_users))
        .route("/user/exists/{username}", get(user::user_exists))
        .route("/user/send_reset_password", post(user::send_reset_password))
        .route("/user/reset_password", post(user::reset_password))
        .route("/user/credentials/{id}", put(user::update_credentials))
        .route("/user/claims/{id}", put(user::update_claims))
        .route(
            "/user/{id}",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
}

fn wh_routes() -> Router<AppState> {
    Router::new()
        .route("/wh/generation", get(wh::get_generation_props))
        .route("/wh/{kind}", post(wh::create_wh).get(wh::list_wh))
        .route(
            "/wh/{kind}/{id}",
            get(wh::get_wh).put(wh::update_wh).delete(wh::delete_wh),
        )
}

/// Full application router. `limiter` is present only when Redis is configured.
pub fn build_router(state: AppState, limiter: Option<Arc<RateLimiter>>) -> Router {
    let api = Router::new()
        .route("/token", post(auth::token))
        .merge(user_routes())
        .merge(wh_routes())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .route("/health", get(routes::health));

    let mut router = Router::new()
        .nest(&state.config.api_base_uri, api)
        .layer(from_fn(log_errors));

    if let Some(limiter) = limiter {
        router = router.layer(from_fn_with_state(limiter, rate_limit));
    }

    let router = router
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(TraceLayer::new_for_http());

    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
