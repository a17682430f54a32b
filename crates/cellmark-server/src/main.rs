use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use cellmark_server::config::Config;
use cellmark_server::{http, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    // (A) 設定を読んで App を組み立てる
    let config = Config::parse();
    let app = config.build_app().await?;

    // (B) トンネルが既に張られていれば公開 URL を先に拾っておく
    tokio::spawn({
        let host = app.document_host.clone();
        async move {
            let url = host.refresh_host_url().await;
            info!(host_url = %url, "initial host url");
        }
    });

    // (C) サーバー起動（Ctrl-C で graceful shutdown）
    let listener = TcpListener::bind(config.bind).await?;
    info!(
        bind = %config.bind,
        store = %config.store_dir.display(),
        "document host server running"
    );
    axum::serve(listener, http::router(app, config.max_upload_bytes()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
