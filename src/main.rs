mod app;
mod jobs;
mod modules;
mod types;
mod utils;

use crate::{
    app::App,
    types::{Config, ToContext},
};
use std::sync::Arc;
use tracing_subscriber::prelude::*;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().map_err(|err| {
        tracing::error!("Invalid configuration: {}", err);
        err
    })?;
    tracing::debug!("Starting in {:?} mode", config.app.environment);

    let ctx = Arc::new(config.to_context().await?);

    let jobs = jobs::monitor(ctx.clone());

    App::new(ctx).run(jobs, app::shutdown_signal()).await?;

    Ok(())
}
