// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;

use mission_control_server::{
    api::router, config::AppConfig, logging::init_tracing, state::AppState, storage::Store,
};

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server terminated with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = config.bind_address().parse()?;

    let store = Store::open(&config.database_path())?;

    let tls = config.tls.clone();
    let state = AppState::new(config, store)?;
    let app = router(state);

    let shutdown = CancellationToken::new();
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));
    tokio::spawn({
        let shutdown = shutdown.clone();
        let handle = handle.clone();
        async move {
            shutdown.cancelled().await;
            tracing::info!("Shutdown signal received, draining connections");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match tls {
        Some(paths) => {
            let tls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;
            tracing::info!(%addr, "Mission Control listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Mission Control listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    token.cancel();
}
