use restaurant_app_rust::cart::AppState;
use restaurant_app_rust::config::{Config, MenuSource};
use restaurant_app_rust::menu::{
    FirestoreRestaurantRepository, RestaurantRepository, StaticRestaurantRepository,
};
use restaurant_app_rust::router::create_app_router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_json = matches!(
        std::env::var("LOG_JSON").as_deref(),
        Ok("1" | "true" | "TRUE" | "yes")
    );

    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load()?;

    // Pick the menu data source
    let repo: Arc<dyn RestaurantRepository> = match config.menu_source {
        MenuSource::Firestore(firestore) => {
            info!(project = %firestore.project_id, collection = %firestore.collection, "using Firestore menu");
            Arc::new(FirestoreRestaurantRepository::new(
                firestore,
                config.request_timeout,
            ))
        }
        MenuSource::File(path) => Arc::new(StaticRestaurantRepository::from_json_file(path)),
    };

    // Build application router with all routes and middleware
    let state = Arc::new(AppState::new(repo));
    let app = create_app_router(state.clone());

    // Evict idle sessions in the background
    let idle_timeout = config.session_idle_timeout;
    tokio::spawn(async move {
        let period = idle_timeout.clamp(Duration::from_secs(1), Duration::from_secs(60));
        let mut sweep = tokio::time::interval(period);
        loop {
            sweep.tick().await;
            state.evict_idle(idle_timeout);
        }
    });

    // Configure the server address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server running on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
