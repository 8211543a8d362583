//! Timer and activity wiring for the session synchronizer.
//!
//! The synchronizer itself is plain async methods; this driver owns the
//! tokio tasks that call them: a keep-alive ticker and an activity event
//! loop fed by the host (the analog of tab-visibility and window-focus
//! listeners). Tests skip the driver and call the methods directly.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::platform::{AuthApi, ProfileApi};

use super::{KEEP_ALIVE_INTERVAL, SessionSynchronizer};

/// Host-reported activity that may warrant a revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    /// The tab became visible.
    BecameVisible,
    /// The window gained focus.
    Focused,
}

/// A channel for the host to report activity events on.
#[must_use]
pub fn activity_channel() -> (
    mpsc::UnboundedSender<ActivityEvent>,
    mpsc::UnboundedReceiver<ActivityEvent>,
) {
    mpsc::unbounded_channel()
}

/// Handles to the background tasks driving a synchronizer.
pub struct SessionRuntime {
    keep_alive: JoinHandle<()>,
    activity: JoinHandle<()>,
}

impl SessionRuntime {
    /// Stop the timers and the event loop.
    ///
    /// Call [`SessionSynchronizer::teardown`] as well so in-flight results
    /// are dropped and the initialization guard resets.
    pub fn shutdown(self) {
        self.keep_alive.abort();
        self.activity.abort();
    }
}

/// Spawn the keep-alive ticker and the activity event loop.
pub fn spawn<A, P>(
    sync: SessionSynchronizer<A, P>,
    mut activity: mpsc::UnboundedReceiver<ActivityEvent>,
) -> SessionRuntime
where
    A: AuthApi + Send + Sync + 'static,
    P: ProfileApi + Send + Sync + 'static,
{
    let keep_alive = {
        let sync = sync.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(KEEP_ALIVE_INTERVAL);
            // The first tick completes immediately; the cadence starts
            // one interval out.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sync.keep_alive_tick().await;
            }
        })
    };

    let activity = tokio::spawn(async move {
        while let Some(event) = activity.recv().await {
            debug!(?event, "Activity reported");
            sync.handle_became_active().await;
        }
    });

    SessionRuntime {
        keep_alive,
        activity,
    }
}
