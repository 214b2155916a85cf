use crate::api::{build_router, AppState};
use crate::output::Output;
use crate::scheduler::Scheduler;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use seasonwatch_config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::build_service;

pub struct ServeOptions {
    pub schedule: Option<String>,
    pub no_scheduler: bool,
    pub check_on_startup: bool,
}

/// Run the HTTP API and the recurring check until SIGINT/SIGTERM
pub async fn run_serve(mut config: Config, options: ServeOptions, output: &Output) -> Result<()> {
    if let Some(schedule) = options.schedule {
        config.scheduler.schedule = schedule;
    }
    if options.check_on_startup {
        config.scheduler.run_on_startup = true;
    }

    let service = build_service(&config).await?;

    let mut scheduler = if options.no_scheduler {
        info!(operation = "scheduler_disabled", "Scheduler disabled, serving API only");
        None
    } else {
        let mut scheduler = Scheduler::new(Arc::clone(&service), config.scheduler.clone()).await?;
        scheduler.start().await?;
        Some(scheduler)
    };

    let router = build_router(AppState::new(Arc::clone(&service)), config.server.read_timeout());
    let listener = TcpListener::bind(("0.0.0.0", config.server.port))
        .await
        .wrap_err_with(|| format!("Failed to bind port {}", config.server.port))?;

    info!(
        operation = "server_started",
        port = config.server.port,
        storage = %config.storage.file_path.display(),
        "Listening for requests"
    );
    output.success(format!("Serving on port {}", config.server.port));

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = shutdown_tx.send(true);
            })
            .await
    };

    // Once a signal arrives, in-flight requests get `shutdown_timeout` to drain
    let shutdown_timeout = config.server.shutdown_timeout();
    let drain_deadline = async move {
        let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => {
            result.wrap_err("Server error")?;
        }
        _ = drain_deadline => {
            warn!(
                operation = "shutdown_timeout",
                timeout_ms = shutdown_timeout.as_millis() as u64,
                "Requests still in flight after shutdown timeout, stopping anyway"
            );
        }
    }

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            error!(operation = "scheduler_shutdown_error", error = %e, "Failed to stop scheduler");
        }
    }

    info!(operation = "server_stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
