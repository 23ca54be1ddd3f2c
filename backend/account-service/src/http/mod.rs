/// REST API for account-service
///
/// - `/api/auth/*`: registration, login and password reset (public)
/// - `/api/user/*`: own profile, bearer token required
/// - `/api/admin/*`: user management, `ROLE_ADMIN` required
/// - `/api/secure/*`: role probes
mod admin;
mod auth;
mod extract;
mod secure;
mod user;

pub use extract::{AdminUser, AuthUser, ValidatedJson};

use crate::security::JwtSigner;
use crate::services::{AdminService, CredentialService, ResetDelivery};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Shared HTTP server state
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialService,
    pub admin: AdminService,
    pub signer: Arc<JwtSigner>,
    pub delivery: Arc<dyn ResetDelivery>,
    /// Public registration may pick a role other than `ROLE_USER`
    pub allow_self_assigned_role: bool,
}

/// Build the HTTP router with all API endpoints
pub fn build_router(state: AppState, cors_allowed_origin: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/user/:username", get(user::get_user))
        .route(
            "/api/user/update-profile/:username",
            put(user::update_profile),
        )
        .route(
            "/api/user/update-password/:username",
            put(user::update_password),
        )
        .route(
            "/api/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/api/admin/users/:id",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/api/admin/users/:id/role", patch(admin::change_role))
        .route("/api/secure/user/hello", get(secure::user_hello))
        .route("/api/secure/admin/hello", get(secure::admin_hello))
        .layer(cors_layer(cors_allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!(origin, "Invalid CORS_ALLOWED_ORIGIN; cross-origin requests disabled");
            layer
        }
    }
}

/// Health check endpoint (no auth required)
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Start the HTTP server and run until `shutdown` resolves
pub async fn serve(
    router: Router,
    host: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Starting HTTP API server on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
