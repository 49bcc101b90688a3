pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use learnhub_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AuthConfig;
use crate::services::{
    AuthService, BotCheck, CourseService, JwtService, PasswordResetService, TwoFactorService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AuthConfig,
    pub pool: PgPool,
    pub jwt: JwtService,
    pub auth: AuthService,
    pub two_factor: TwoFactorService,
    pub password_reset: PasswordResetService,
    pub courses: CourseService,
    pub bot_check: Arc<dyn BotCheck>,
}

impl AppState {
    pub fn new(config: AuthConfig, pool: PgPool, bot_check: Arc<dyn BotCheck>) -> Self {
        let jwt = JwtService::new(&config.jwt);

        Self {
            jwt: jwt.clone(),
            auth: AuthService::new(pool.clone(), jwt),
            two_factor: TwoFactorService::new(pool.clone(), config.totp_issuer.clone()),
            password_reset: PasswordResetService::new(pool.clone()),
            courses: CourseService::new(pool.clone()),
            bot_check,
            config,
            pool,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Full session + device lock; the lock loads the account row, so the
    // order of these layers matters (layers run bottom-up).
    let protected = Router::new()
        .route("/auth/logout", post(handlers::auth::session::logout))
        .route("/auth/2fa/setup", post(handlers::auth::two_factor::setup))
        .route("/users/me", get(handlers::auth::session::me))
        .route("/courses/:course_id", get(handlers::course::get_course))
        .route("/enrollments", post(handlers::course::enroll))
        .route(
            "/enrollments/:user_id",
            get(handlers::course::list_enrollments),
        )
        .route(
            "/enrollments/:user_id/:course_id",
            delete(handlers::course::unenroll),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::device_lock_middleware,
        ))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    // Management routes live under their own prefix so the role gate wraps
    // the whole group.
    let admin = Router::new()
        .route("/admin/courses", post(handlers::course::create_course))
        .route(
            "/admin/courses/:course_id",
            put(handlers::course::update_course).delete(handlers::course::delete_course),
        )
        .route("/admin/users", get(handlers::user::list_users))
        .layer(from_fn(middleware::admin_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::device_lock_middleware,
        ))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    // Accepts two-factor-scoped credentials, so it cannot sit behind the
    // full-session gate.
    let two_factor_verify = Router::new()
        .route("/auth/2fa/verify", post(handlers::auth::two_factor::verify))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::error!(origin = %o, error = %e, "Skipping invalid CORS origin");
                        None
                    }
                })
                .collect::<Vec<HeaderValue>>(),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/register", post(handlers::auth::registration::register))
        .route("/auth/login", post(handlers::auth::session::login))
        .route(
            "/auth/password-reset/request",
            post(handlers::auth::password::request_reset),
        )
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::password::confirm_reset),
        )
        .route("/courses", get(handlers::course::list_courses))
        .merge(two_factor_verify)
        .merge(protected)
        .merge(admin)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}
