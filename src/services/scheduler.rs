//! Periodic task scheduler
//!
//! Runs background maintenance at fixed intervals. Add new tasks by
//! implementing the `PeriodicTask` trait.

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::CONFIG;
use crate::models::verification_token;
use crate::services::clock::SharedClock;
use crate::services::invitation::InvitationService;
use crate::state::{AppState, DbConn};

/// Trait for periodic background tasks
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name for logging
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    async fn run(&self) -> anyhow::Result<()>;
}

/// Spawn every periodic task on the runtime.
pub fn start_scheduler(state: &AppState) -> Vec<JoinHandle<()>> {
    let tasks: Vec<Box<dyn PeriodicTask>> = vec![
        Box::new(InvitationSweepTask {
            invitations: InvitationService::from_state(state),
            every: Duration::from_secs(CONFIG.invitation.sweep_interval_secs),
        }),
        Box::new(VerificationTokenCleanupTask {
            db: state.db.clone(),
            clock: state.clock.clone(),
        }),
    ];

    let handles = tasks
        .into_iter()
        .map(|task| tokio::spawn(run_task(task)))
        .collect();

    tracing::info!("Periodic task scheduler started");
    handles
}

/// Run a single task on its interval
async fn run_task(task: Box<dyn PeriodicTask>) {
    let mut ticker = interval(task.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Skip the first immediate tick
    ticker.tick().await;

    loop {
        ticker.tick().await;

        tracing::debug!(task = task.name(), "Running periodic task");

        match task.run().await {
            Ok(()) => {
                tracing::debug!(task = task.name(), "Periodic task completed");
            }
            Err(e) => {
                tracing::error!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }
}

// ============================================================================
// Invitation Sweep Task
// ============================================================================

/// Moves pending invitations past their deadline to `expired`.
pub struct InvitationSweepTask {
    pub invitations: InvitationService,
    pub every: Duration,
}

#[async_trait]
impl PeriodicTask for InvitationSweepTask {
    fn name(&self) -> &'static str {
        "invitation_sweep"
    }

    fn interval(&self) -> Duration {
        self.every
    }

    async fn run(&self) -> anyhow::Result<()> {
        self.invitations.sweep_expired().await?;
        Ok(())
    }
}

// ============================================================================
// Verification Token Cleanup Task
// ============================================================================

/// Deletes verification tokens that expired or were used more than a day ago.
pub struct VerificationTokenCleanupTask {
    pub db: DbConn,
    pub clock: SharedClock,
}

#[async_trait]
impl PeriodicTask for VerificationTokenCleanupTask {
    fn name(&self) -> &'static str {
        "verification_token_cleanup"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(60 * 60) // Every hour
    }

    async fn run(&self) -> anyhow::Result<()> {
        let cutoff = self.clock.now() - ChronoDuration::days(1);

        let deleted = verification_token::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(verification_token::Column::ExpiresAt.lt(cutoff))
                    .add(
                        Condition::all()
                            .add(verification_token::Column::IsUsed.eq(true))
                            .add(verification_token::Column::UsedAt.lt(cutoff)),
                    ),
            )
            .exec(&self.db)
            .await?;

        if deleted.rows_affected > 0 {
            tracing::info!(count = deleted.rows_affected, "Cleaned up verification tokens");
        }

        Ok(())
    }
}
