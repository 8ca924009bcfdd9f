//! Background deadline sweeper. Grading enforces deadlines on its own at
//! submission time; the sweeper only closes abandoned live questions so
//! subscribers see a terminal event even when the host walks away.

use crate::state::SessionEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn the sweeper loop. Dropped with the runtime; holding the engine in
/// an `Arc` keeps it alive for as long as the task runs.
pub fn spawn_deadline_sweeper(engine: Arc<SessionEngine>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!(?interval, "Deadline sweeper running");
        loop {
            tokio::time::sleep(interval).await;
            let closed = engine.close_expired_questions().await;
            if closed > 0 {
                tracing::info!(closed, "Sweeper closed expired questions");
            }
        }
    })
}
