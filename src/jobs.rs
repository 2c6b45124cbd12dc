use crate::modules;
use crate::types::{Context, SchedulableJob};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Owns the running background jobs. Dropping it leaves them running; call
/// [`JobHandle::shutdown`] to stop them.
pub struct JobHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl JobHandle {
    pub async fn shutdown(self) {
        self.token.cancel();

        for task in self.tasks {
            if let Err(err) = task.await {
                tracing::error!("Background job ended abnormally: {}", err);
            }
        }

        tracing::debug!("Background jobs stopped");
    }
}

pub fn monitor(ctx: Arc<Context>) -> JobHandle {
    spawn(modules::otp::job::list(ctx))
}

pub fn spawn(jobs: Vec<SchedulableJob>) -> JobHandle {
    let token = CancellationToken::new();
    let tasks = jobs
        .into_iter()
        .map(|job| tokio::spawn(run(job, token.child_token())))
        .collect();

    JobHandle { token, tasks }
}

async fn run(job: SchedulableJob, token: CancellationToken) {
    tracing::info!("Scheduling {} every {:?}", job.name, job.interval);

    let mut ticker = time::interval_at(Instant::now() + job.interval, job.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(err) = (job.job)().await {
                    tracing::error!("Job {} failed: {:#}", job.name, err);
                }
            }
        }
    }

    tracing::debug!("Job {} stopped", job.name);
}
