use duties::application::{duty_service::DutyServiceImpl, seed};
use duties::config::Config;
use duties::domain::repository::DutyRepository;
use duties::http::routing::{self, normalize_base_path};
use duties::http::routes::duties as duty_routes;
use duties::infrastructure::sqlite_repo::SqliteDutyRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let repo = SqliteDutyRepository::connect(&config.database_url, config.max_connections).await?;
    repo.init().await?;
    if config.seed {
        seed::seed_if_empty(&repo, seed::DEFAULT_DUTIES).await?;
    }
    let service = DutyServiceImpl::new(repo);
    let duties_router = duty_routes::router(duty_routes::AppState { service });
    let router = routing::app(duties_router, &config.api_path, config.client_origin.clone());

    let addr = config.addr();
    tracing::info!(%addr, base_path = %normalize_base_path(&config.api_path), "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
