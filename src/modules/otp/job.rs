use crate::types::{Context, SchedulableJob};
use std::sync::Arc;

async fn clean_expired_otps_job(ctx: Arc<Context>) -> anyhow::Result<()> {
    tracing::info!("Cleaning up expired otps");

    let deleted = ctx.otp.manager.sweep_expired().await?;
    tracing::info!("Removed {} expired otp(s)", deleted);

    Ok(())
}

pub fn list(ctx: Arc<Context>) -> Vec<SchedulableJob> {
    let interval = ctx.otp.sweep_interval;
    vec![SchedulableJob::new(
        "otp::clean_expired",
        interval,
        move || {
            let ctx = ctx.clone();
            async move { clean_expired_otps_job(ctx).await }
        },
    )]
}
