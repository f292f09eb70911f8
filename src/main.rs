mod db;
mod discord;
mod routes;
mod signal;
mod state;
mod sweep;
#[cfg(test)]
mod testing;

use anyhow::Context;
use db::SqliteCredentialStore;
use discord::HttpDiscord;
use dotenv::dotenv;
use signal::signal_handler;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use state::StateRef;
use std::{env, net::SocketAddr, str::FromStr, sync::Arc, time::Duration};
use sweep::RandomDelay;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v9/";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sweepcord=debug,tower_http=info".into()),
        )
        .init();

    info!("Starting up...");

    let state = {
        let db = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let options = SqliteConnectOptions::from_str(&db)
            .context("could not create options")?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        sqlx::migrate!().run(&pool).await?;

        let api_base = env::var("DISCORD_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let api_base = Url::parse(&api_base).context("DISCORD_API_BASE is not a valid url")?;
        let timeout = env::var("DISCORD_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .context("DISCORD_TIMEOUT_SECS is not a number")?;
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("could not build http client")?;

        Arc::new(StateRef::new(
            Arc::new(HttpDiscord::new(client, api_base)),
            Arc::new(SqliteCredentialStore::new(pool)),
            Arc::new(RandomDelay::default()),
        ))
    };

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .context("PORT is not a valid port")?;
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    let mut stop_rx = signal_handler();
    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(async move {
            stop_rx.changed().await.ok();
            info!(
                "Shutting down, cancelling {} running sweeps",
                shutdown_state.sweeps.len()
            );
            shutdown_state.sweeps.cancel_all();
        })
        .await?;

    Ok(())
}
