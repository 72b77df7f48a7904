use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::check_access::check_access;
use super::handlers::create_apiary::create_apiary;
use super::handlers::forgot_password::forgot_password;
use super::handlers::get_me::get_me;
use super::handlers::grant_access::grant_access;
use super::handlers::list_grants::list_grants;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::revoke_access::revoke_access;
use super::handlers::update_me::update_me;
use super::handlers::validate_reset_token::validate_reset_token;
use super::middleware::authenticate as auth_middleware;
use crate::domain::account::ports::AccountServicePort;

pub struct AppState<S: AccountServicePort> {
    pub account_service: Arc<S>,
}

impl<S: AccountServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
        }
    }
}

pub fn create_router<S: AccountServicePort>(account_service: Arc<S>) -> Router {
    let state = AppState { account_service };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/forgot-password", post(forgot_password::<S>))
        .route("/api/auth/reset-password", post(reset_password::<S>))
        .route(
            "/api/auth/reset-password/validate",
            post(validate_reset_token::<S>),
        );

    let protected_routes = Router::new()
        .route("/api/users/me", get(get_me::<S>).patch(update_me::<S>))
        .route("/api/users/me/password", post(change_password::<S>))
        .route("/api/apiaries", post(create_apiary::<S>))
        .route("/api/apiaries/:apiary_id/access", get(check_access::<S>))
        .route("/api/apiaries/:apiary_id/grants", get(list_grants::<S>))
        .route(
            "/api/apiaries/:apiary_id/grants/:user_id",
            put(grant_access::<S>).delete(revoke_access::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis() as u64,
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
