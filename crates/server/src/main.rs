use anyhow::Context;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parley::app;
use parley::config::Settings;
use parley::http::router::build_router;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let db = Db::new(&settings.database.url).await?;
    app::seed(&db, &settings).await?;

    let collaborators = app::collaborators(&settings)?;
    let runtime = app::build(&settings, db, collaborators)?;

    let cancel_token = CancellationToken::new();
    let worker = tokio::spawn(adapter::start_with_cancel_token(
        runtime.enricher,
        runtime.jobs,
        settings.enrichment.workers,
        cancel_token.clone(),
    ));

    let app = build_router(runtime.state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cancel_token.cancel();
    match worker.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Enrichment worker failed: {:?}", e),
        Err(e) => tracing::error!("Enrichment worker crashed: {:?}", e),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
