use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use data_service::{DataService, HttpTransport, WritePolicy};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod navigation;

use config::load_settings;
use controller::ActiveView;
use navigation::Route;

/// Shows a view of the workflow backend as JSON, re-rendering whenever the
/// shared store changes.
#[derive(Parser, Debug)]
struct Args {
    /// Route to open, e.g. `/files/42`, `/runs/7` or `/workflows`.
    route: String,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    write_policy: Option<WritePolicy>,
    #[arg(long)]
    render_idle_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(policy) = args.write_policy {
        settings.write_policy = policy;
    }
    if let Some(idle) = args.render_idle_ms {
        settings.render_idle_ms = idle;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let route: Route = args.route.parse()?;
    let transport = HttpTransport::with_timeout(&settings.server_url, settings.request_timeout())
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let service = DataService::with_policy(Arc::new(transport), settings.write_policy);
    info!(
        server_url = %settings.server_url,
        write_policy = %settings.write_policy,
        ?route,
        "viewer: activating route"
    );

    let mut changes = service.get_active_data().subscribe();
    let view = ActiveView::activate(route, &service);

    view.loading().wait_ready().await;
    print_view(&view).await?;

    loop {
        match tokio::time::timeout(settings.render_idle(), changes.recv()).await {
            Ok(Ok(event)) => {
                debug!(field = %event.field, generation = event.generation, "viewer: store changed");
                print_view(&view).await?;
            }
            Ok(Err(RecvError::Lagged(skipped))) => {
                debug!(skipped, "viewer: fell behind store changes");
                print_view(&view).await?;
            }
            Ok(Err(RecvError::Closed)) | Err(_) => break,
        }
    }

    if let Some(error) = view.loading().error() {
        anyhow::bail!("view failed to load: {error}");
    }
    Ok(())
}

async fn print_view(view: &ActiveView) -> Result<()> {
    let rendered = view.render().await?;
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}
