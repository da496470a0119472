// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use kube::Client;
use pihole_operator::{
    config::{Config, LogFormat},
    constants::CONTROLLER_NAME,
    context::Context,
    controller::run_dnsname_controller,
    pihole::PiHoleClient,
    reconcilers::KubeDeclaredStore,
    server::serve_metrics,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name(CONTROLLER_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: Config) -> Result<()> {
    init_tracing(config.log_format);

    info!("Starting Pi-hole DNS operator");
    debug!(
        pihole_url = %config.pihole_url,
        concurrency = config.max_concurrent_reconciles,
        requeue_interval_secs = config.requeue_interval_secs,
        "Configuration loaded"
    );

    let backend = Arc::new(PiHoleClient::new(
        &config.pihole_url,
        config.pihole_password.clone(),
    )?);

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let store = Arc::new(KubeDeclaredStore::new(client.clone(), config.pod_name.clone()));
    let context = Arc::new(Context::new(
        store,
        backend.clone(),
        config.requeue_interval(),
    ));

    // The controller stops on SIGINT/SIGTERM after finishing in-flight passes
    let result = tokio::select! {
        result = run_dnsname_controller(client, context, config.max_concurrent_reconciles) => result,
        result = serve_metrics(config.metrics_bind_address) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result.and_then(|()| Err(anyhow::anyhow!("metrics server exited unexpectedly without error")))
        }
    };

    if let Err(e) = backend.close().await {
        warn!(error = %e, "Failed to close Pi-hole session");
    }

    info!("Pi-hole DNS operator stopped");
    result
}
