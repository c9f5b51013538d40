//! Background sync scheduler: periodically drains due keys from the sync
//! queue and reconciles each to the blob tier, independently of the others.

use crate::service::ResourceService;
use crate::time::now_ms;
use crate::traits::{BlobStore, LockService, SharedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Owns the periodic timer driving reconciliation. Dropping or calling
/// [`SyncScheduler::shutdown`] stops scheduling new sweeps; work already
/// dispatched for the in-flight sweep is allowed to finish.
pub struct SyncScheduler {
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncScheduler {
    /// Start the periodic sweep. `service` is shared with the sweep task via
    /// `Arc`, matching the resource cache's own handle to it.
    pub fn start<B, C, L>(service: Arc<ResourceService<B, C, L>>, period_ms: u64, batch: usize) -> Self
    where
        B: BlobStore + ?Sized + 'static,
        C: SharedCache + ?Sized + 'static,
        L: LockService + ?Sized + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(period_ms));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_sweep(&service, batch).await;
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("sync scheduler shutting down");
                        break;
                    }
                }
            }
        });

        Self { shutdown_tx }
    }

    /// Stop scheduling future sweeps. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn run_sweep<B, C, L>(service: &Arc<ResourceService<B, C, L>>, batch: usize)
where
    B: BlobStore + ?Sized + 'static,
    C: SharedCache + ?Sized + 'static,
    L: LockService + ?Sized + 'static,
{
    let due = match service.cache.due_keys(now_ms(), batch).await {
        Ok(keys) => keys,
        Err(err) => {
            warn!(error = %err, "failed to read sync queue");
            return;
        }
    };

    for key in due {
        let service = Arc::clone(service);
        tokio::spawn(async move {
            sync_one(&service, key).await;
        });
    }
}

async fn sync_one<B, C, L>(service: &Arc<ResourceService<B, C, L>>, key: String)
where
    B: BlobStore + ?Sized + 'static,
    C: SharedCache + ?Sized + 'static,
    L: LockService + ?Sized + 'static,
{
    let Ok(Some(_guard)) = service.locks().try_lock(&key).await else {
        debug!(key, "lock unavailable, skipping until next sweep");
        return;
    };

    if let Err(err) = service.sync_one(&key).await {
        warn!(key, error = %err, "sync of key failed, will retry next sweep");
    }
}
