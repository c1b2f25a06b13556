use std::sync::Arc;

use blog_portal::{
    build_app,
    config::Config,
    db,
    repository::BlogRepository,
    routes::AppState,
};
use poem::listener::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let db = db::connect(&config.database_url).await?;
    let state = Arc::new(AppState {
        repo: BlogRepository::new(db),
        search: config.search.clone(),
        contact_content: config.contact_content.clone(),
    });

    let addr = config.bind_addr();
    let app = build_app(state, format!("http://{addr}"), config.static_dir.clone());

    info!("blog portal listening on http://{addr}");
    poem::Server::new(TcpListener::bind(addr)).run(app).await?;
    Ok(())
}
