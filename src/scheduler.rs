// src/scheduler.rs

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::tasks;

/// Starts the daily inactivity sweep (03:00 server time).
pub async fn start_scheduler(pool: PgPool) -> Result<(), JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 0 3 * * *", move |_uuid, _lock| {
        let pool = pool.clone();

        Box::pin(async move {
            match tasks::block_inactive_users(&pool).await {
                Ok(0) => {}
                Ok(count) => log::info!("inactivity sweep deactivated {count} accounts"),
                Err(e) => log::error!("inactivity sweep error: {e}"),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    log::info!("inactivity sweep scheduler started");
    Ok(())
}
