use store_server::api;
use store_server::auth::JwtService;
use store_server::config::Config;
use store_server::db::DbService;
use store_server::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "store_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting store-server (env: {})", config.environment);

    let db = DbService::new(&config.database_path).await?;
    let jwt = JwtService::new(&config.jwt_secret);
    let http_port = config.http_port;

    let state = AppState::new(db.db, jwt, config);
    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("store-server HTTP listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
