//! Studio Booking server
//!
//! REST API for studio reservation requests and their approval workflow.
//! Reads configuration from TOML file (~/.config/studio-booking/config.toml).

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use studio_booking::config::LoggingConfig;
use studio_booking::domain::RepositoryProvider;
use studio_booking::infrastructure::crypto::JwtConfig;
use studio_booking::interfaces::http::middleware::SessionCookie;
use studio_booking::support::ShutdownCoordinator;
use studio_booking::{
    create_api_router, default_config_path, AppConfig, AppState, JsonRepositoryProvider,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = default_config_path();
    let loaded = AppConfig::load_or_init(&config_path);
    let app_cfg = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };
    init_tracing(&app_cfg.logging);
    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    info!("Starting Studio Booking...");

    if app_cfg.security.jwt_secret == studio_booking::config::SecurityConfig::default().jwt_secret {
        warn!("Using the default JWT secret; set security.jwt_secret in the config file");
    }

    // ── Storage ────────────────────────────────────────────────
    let repos: Arc<dyn RepositoryProvider> =
        Arc::new(JsonRepositoryProvider::new(&app_cfg.storage.data_dir));
    info!("Data directory: {}", app_cfg.storage.data_dir.display());

    // ── Sessions ───────────────────────────────────────────────
    let jwt_config = JwtConfig::new(
        app_cfg.security.jwt_secret.clone(),
        app_cfg.security.session_hours,
    );
    let cookie = SessionCookie {
        name: app_cfg.security.cookie_name.clone(),
        secure: app_cfg.security.cookie_secure,
        max_age_secs: jwt_config.expires_in_secs(),
    };
    info!(
        "Sessions expire after {}h (cookie '{}')",
        jwt_config.expiration_hours, cookie.name
    );

    let state = AppState::new(
        Arc::clone(&repos),
        jwt_config,
        cookie,
        app_cfg.security.bcrypt_cost,
    );

    // ── Default admin ──────────────────────────────────────────
    match state
        .user_service
        .ensure_admin(app_cfg.admin.to_new_user())
        .await
    {
        Ok(true) => warn!(
            "Created default admin '{}'; change its password after first sign-in",
            app_cfg.admin.username
        ),
        Ok(false) => {}
        Err(e) => error!("Failed to seed admin account: {}", e),
    }

    // Initialize shutdown coordinator
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();

    // Start listening for shutdown signals (SIGTERM, SIGINT)
    shutdown.start_signal_listener();

    let api_router = create_api_router(state);

    // Start REST API server with graceful shutdown
    let api_addr = app_cfg.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown_signal.clone();
    let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
        api_shutdown.wait().await;
        info!("REST API server received shutdown signal");
    });

    let mut api_task = tokio::spawn(async move { api_server.await });

    tokio::select! {
        result = &mut api_task => {
            match result {
                Ok(Ok(())) => info!("REST API server stopped"),
                Ok(Err(e)) => error!("REST API server error: {}", e),
                Err(e) => error!("REST API server task panicked: {}", e),
            }
        }
        _ = shutdown_signal.wait() => {
            // In-flight requests get `shutdown_timeout` seconds to finish
            match tokio::time::timeout(shutdown.timeout(), &mut api_task).await {
                Ok(_) => info!("REST API server drained"),
                Err(_) => {
                    warn!("Shutdown timeout reached; aborting remaining requests");
                    api_task.abort();
                }
            }
        }
    }

    info!("Studio Booking shutdown complete");
    Ok(())
}
