use listenfd::ListenFd;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use storefront::{
    config::Config,
    pool::{get_pool, run_migrations},
    state::AppState,
    utils::error::StartupError,
};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    if config.run_migrations {
        run_migrations(&config.database_url).await?;
    }

    let pool = get_pool(&config).await?;

    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // inherited socket, e.g. from systemfd
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        None => TcpListener::bind(config.bind_addr).await?,
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    let app = storefront::app(AppState::new(pool, config));
    axum::serve(listener, app).await?;

    Ok(())
}
