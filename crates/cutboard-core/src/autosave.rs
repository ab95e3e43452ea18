//! Periodic autosave
//!
//! The session is single-writer; the tick shares it behind a
//! `parking_lot::Mutex` and saves only while someone is logged in.

use crate::session::Session;
use cutboard_store::StorageBackend;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Session shared between the command loop and the autosave tick
pub type SharedSession<S> = Arc<Mutex<Session<S>>>;

/// Wrap a session for sharing
#[must_use]
pub fn share<S: StorageBackend>(session: Session<S>) -> SharedSession<S> {
    Arc::new(Mutex::new(session))
}

/// Spawn the autosave tick; the first save happens one `period` from now
///
/// Abort the returned handle to stop ticking.
pub fn spawn_autosave<S>(session: SharedSession<S>, period: Duration) -> JoinHandle<()>
where
    S: StorageBackend + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let saved = session.lock().autosave();
            tracing::debug!(saved, "Autosave tick");
        }
    })
}
