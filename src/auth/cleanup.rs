//! Background cleanup worker for expired sessions and stale cached pages.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::web::PageCache;

/// Run a single cleanup cycle.
async fn cleanup_once(pool: &SqlitePool, page_cache: &PageCache) {
    match crate::db::delete_expired_sessions(pool).await {
        Ok(count) => {
            if count > 0 {
                tracing::info!(expired_sessions = count, "Cleaned up expired sessions");
            }
        }
        Err(e) => {
            tracing::error!("Failed to delete expired sessions: {e:#}");
        }
    }

    let evicted = page_cache.purge_expired();
    if evicted > 0 {
        tracing::debug!(evicted_pages = evicted, "Evicted stale cached pages");
    }
}

/// Run the cleanup worker.
/// This task runs cleanup immediately on start, then at the given interval.
/// It respects the cancellation token for graceful shutdown.
pub async fn run_cleanup_worker(
    pool: SqlitePool,
    page_cache: Arc<PageCache>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting cleanup worker"
    );

    cleanup_once(&pool, &page_cache).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // Skip the first immediate tick (we already ran cleanup)

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cleanup_once(&pool, &page_cache).await;
            }
            () = shutdown.cancelled() => {
                tracing::info!("Cleanup worker shutting down");
                break;
            }
        }
    }
}
