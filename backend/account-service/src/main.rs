/// Account Service Main Entry Point
///
/// Starts the HTTP API with:
/// - PostgreSQL connection pool and migrations
/// - Email service (SMTP or log-only)
/// - Bootstrap admin seeding
/// - Expired reset token purge (background task, optional)
use account_service::{
    clock::{Clock, SystemClock},
    config::Settings,
    db::{PgResetTokenStore, PgUserStore, ResetTokenStore, UserStore},
    http::{self, AppState},
    security::PasswordHasher,
    services::{seed_admin, AdminService, CredentialService, EmailService, ResetDelivery},
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "account_service=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting Account Service");

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    info!(
        algorithm = settings.jwt.algorithm(),
        issuer = %settings.jwt.issuer,
        "Configuration loaded successfully"
    );

    let signer = Arc::new(settings.jwt.build_signer()?);
    let hasher = Arc::new(
        PasswordHasher::new(&settings.password).context("Failed to initialize password hasher")?,
    );

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(
        "Database pool initialized with {} max connections",
        settings.database.max_connections
    );

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db_pool.clone()));
    let reset_tokens: Arc<dyn ResetTokenStore> = Arc::new(PgResetTokenStore::new(db_pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let credentials = CredentialService::new(
        Arc::clone(&users),
        Arc::clone(&reset_tokens),
        Arc::clone(&hasher),
        Arc::clone(&signer),
        Arc::clone(&clock),
        settings.reset.window(),
    );
    let admin = AdminService::new(users, reset_tokens, hasher, clock);

    let email_service = EmailService::new(&settings.email).context("Failed to configure email")?;
    info!(smtp_enabled = email_service.is_enabled(), "Email service initialized");
    let delivery: Arc<dyn ResetDelivery> = Arc::new(email_service);

    seed_admin(&admin, &settings.bootstrap)
        .await
        .context("Failed to seed bootstrap admin")?;

    if settings.reset.purge_interval_secs > 0 {
        spawn_reset_token_purge(
            credentials.clone(),
            Duration::from_secs(settings.reset.purge_interval_secs),
        );
    }

    let state = AppState {
        credentials,
        admin,
        signer,
        delivery,
        allow_self_assigned_role: settings.server.allow_self_assigned_role,
    };
    let router = http::build_router(state, &settings.server.cors_allowed_origin);

    http::serve(
        router,
        &settings.server.host,
        settings.server.port,
        shutdown_signal(),
    )
    .await
    .context("HTTP server error")?;

    info!("Account service shutdown complete");

    Ok(())
}

/// Periodically delete expired reset tokens
fn spawn_reset_token_purge(credentials: CredentialService, every: Duration) {
    info!(interval_secs = every.as_secs(), "Starting reset token purge task");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = credentials.purge_expired_tokens().await {
                error!(error = %e, "Reset token purge failed");
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}
