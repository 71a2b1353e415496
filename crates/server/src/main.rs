//! chirp server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use chirp_api::{AppState, auth_middleware, router as api_router};
use chirp_common::Config;
use chirp_core::{
    FeedService, FollowService, HttpPageInvalidator, LikeService, ProfileService,
    SharedInvalidator, TweetService,
};
use chirp_db::repositories::{FollowRepository, LikeRepository, TweetRepository, UserRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirp=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting chirp server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = chirp_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    chirp_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let tweet_repo = TweetRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    // Frontend revalidation hook, when configured
    let invalidator: Option<SharedInvalidator> = config
        .frontend
        .revalidate_url
        .as_ref()
        .map(|url| Arc::new(HttpPageInvalidator::new(url.clone())) as SharedInvalidator);
    if invalidator.is_some() {
        info!("Frontend revalidation hook enabled");
    }

    // Initialize services
    let feed_service = FeedService::new(
        tweet_repo.clone(),
        like_repo.clone(),
        follow_repo.clone(),
        user_repo.clone(),
    );
    let mut tweet_service = TweetService::new(tweet_repo.clone(), user_repo.clone());
    let like_service = LikeService::new(like_repo.clone(), tweet_repo.clone());
    let mut follow_service = FollowService::new(follow_repo.clone(), user_repo.clone());
    let profile_service = ProfileService::new(user_repo.clone(), tweet_repo, follow_repo);

    if let Some(invalidator) = invalidator {
        tweet_service.set_invalidator(Arc::clone(&invalidator));
        follow_service.set_invalidator(invalidator);
    }

    let state = AppState {
        feed_service,
        tweet_service,
        like_service,
        follow_service,
        profile_service,
        user_repo,
    };

    // Build the router
    let app = Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(addr = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
