use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use facetrack_registry::Replica;

use crate::event::{RemoteEvent, RemoteEventKind, decode_record};
use crate::store::{RemoteStore, Subscription};
use crate::SyncError;

/// Drives a [`Replica`] from the remote store's change feed.
///
/// One adapter runs per active session. It is stateless between
/// restarts beyond the subscription itself: on a fresh start the
/// store's subscribe-time replay rebuilds the replica.
pub struct SyncAdapter;

impl SyncAdapter {
    /// Subscribes to `store` and spawns the receive loop.
    pub async fn start(
        store: Arc<dyn RemoteStore>,
        replica: Arc<Replica>,
    ) -> Result<SyncHandle, SyncError> {
        let subscription = store.subscribe().await?;
        let cancel = CancellationToken::new();
        let (live_tx, live_rx) = watch::channel(true);

        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            receive_loop(subscription, replica, loop_cancel, live_tx).await;
        });

        Ok(SyncHandle {
            cancel,
            task,
            live: live_rx,
        })
    }
}

/// Handle to a running sync task.
pub struct SyncHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    live: watch::Receiver<bool>,
}

impl SyncHandle {
    /// True while the change feed is attached. Turns false after a feed
    /// failure or [`SyncHandle::stop`]; replica state stays readable
    /// either way, possibly stale.
    pub fn is_live(&self) -> bool {
        *self.live.borrow()
    }

    /// Stops the receive loop. Once this returns, no further replica
    /// mutation can come from the feed.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                error!(error = %e, "sync task join failed");
            }
        }
    }
}

async fn receive_loop(
    mut subscription: Subscription,
    replica: Arc<Replica>,
    cancel: CancellationToken,
    live: watch::Sender<bool>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("sync: receive loop cancelled");
                let _ = live.send(false);
                return;
            }
            item = subscription.next() => match item {
                Some(Ok(event)) => apply_event(&replica, event),
                Some(Err(e)) => {
                    error!(error = %e, "sync: change feed failed, registry is now stale");
                    let _ = live.send(false);
                    return;
                }
                None => {
                    info!("sync: change feed ended");
                    let _ = live.send(false);
                    return;
                }
            }
        }
    }
}

fn apply_event(replica: &Replica, event: RemoteEvent) {
    match event.kind {
        RemoteEventKind::Added { id, payload } | RemoteEventKind::Changed { id, payload } => {
            match decode_record(&id, &payload) {
                Ok(record) => {
                    if replica.apply_upsert(event.seq, record) {
                        debug!(%id, seq = event.seq, "sync: applied upsert");
                    }
                }
                // A bad record from a foreign writer must not stop the
                // feed; skip it and keep applying later events.
                Err(e) => warn!(%id, error = %e, "sync: skipping malformed record"),
            }
        }
        RemoteEventKind::Removed { id } => {
            if replica.apply_remove(event.seq, &id) {
                debug!(%id, seq = event.seq, "sync: applied remove");
            }
        }
    }
}
