//! Entry point: parses the process surface, builds the Kubernetes client,
//! and runs the `ImageUpdateAutomation` controller alongside the
//! health/readiness HTTP server.

use clap::Parser;
use futures::StreamExt;
use image_update_automation::config::ProcessConfig;
use image_update_automation::context::Context;
use image_update_automation::crds::ImageUpdateAutomation;
use image_update_automation::{controllers, health};
use kube::api::Api;
use kube::runtime::events::Reporter;
use kube::runtime::{watcher, Controller};
use kube::Client;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProcessConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!(concurrent = config.concurrent, "image-automation-controller starting");

    let client = Client::try_default().await?;
    let readiness = health::ReadinessFlag::new();

    let health_addr = config.health_addr.clone();
    let health_router = health::router(readiness.clone());

    let automations: Api<ImageUpdateAutomation> = if config.watch_all_namespaces {
        Api::all(client.clone())
    } else {
        Api::default_namespaced(client.clone())
    };

    let mut watcher_config = watcher::Config::default();
    if let Some(selector) = &config.watch_label_selector {
        watcher_config = watcher_config.labels(selector);
    }

    let reporter: Reporter = "image-automation-controller".into();

    let context = Arc::new(Context {
        client: client.clone(),
        config,
        reporter,
    });

    let controller = Controller::new(automations, watcher_config)
        .concurrency(context.config.concurrent as u16)
        .shutdown_on_signal()
        .run(controllers::reconcile, controllers::error_policy, context.clone())
        .for_each(|result| {
            let readiness = readiness.clone();
            async move {
                readiness.mark_ready();
                match result {
                    Ok(object) => tracing::debug!(?object, "reconciled"),
                    Err(error) => tracing::warn!(%error, "reconcile failed"),
                }
            }
        });

    let health_server = async {
        let listener = tokio::net::TcpListener::bind(&health_addr).await?;
        axum::serve(listener, health_router).await?;
        Ok::<(), std::io::Error>(())
    };

    tokio::select! {
        _ = controller => {}
        result = health_server => {
            if let Err(error) = result {
                tracing::error!(%error, "health server exited");
            }
        }
    }

    tracing::info!("image-automation-controller shutting down");
    Ok(())
}
