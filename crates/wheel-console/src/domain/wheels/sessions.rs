use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use tokio::{sync::RwLock, time::sleep};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wheel_core::WheelEditor;

use crate::domain::Error;

struct Session {
    editor: WheelEditor,
    touched: Instant,
}

/// Open editor sessions, one per browser tab editing a wheel
#[derive(Clone, Default)]
pub struct EditorSessions {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl EditorSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, editor: WheelEditor) -> Uuid {
        let id = Uuid::now_v7();
        self.sessions.write().await.insert(
            id,
            Session {
                editor,
                touched: Instant::now(),
            },
        );
        debug!("opened editor session {}", id);
        id
    }

    /// Run `f` against the session's editor while holding the lock.
    /// `f` must not await.
    pub async fn with_editor<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut WheelEditor) -> R,
    ) -> Result<R, Error> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(String::from("This editor session has expired.")))?;
        session.touched = Instant::now();
        Ok(f(&mut session.editor))
    }

    pub async fn snapshot(&self, id: &Uuid) -> Result<WheelEditor, Error> {
        self.with_editor(id, |editor| editor.clone()).await
    }

    pub async fn close(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for longer than `max_idle`, except ones waiting
    /// on the backend
    pub async fn sweep(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.editor.is_pending() || s.touched.elapsed() < max_idle);
        before - sessions.len()
    }
}

/// Floor for the sweep interval, a zero interval would spin on the lock
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

pub struct SessionSweeper {
    sessions: EditorSessions,
    max_idle: Duration,
    sweep_interval: Duration,
    cancel_token: CancellationToken,
}

impl SessionSweeper {
    pub fn new(
        sessions: EditorSessions,
        cancel_token: CancellationToken,
        max_idle: Duration,
        sweep_interval: Duration,
    ) -> Self {
        if sweep_interval < MIN_SWEEP_INTERVAL {
            warn!(
                "session sweep interval {:?} is below the minimum, using {:?}",
                sweep_interval, MIN_SWEEP_INTERVAL
            );
        }
        Self {
            sessions,
            max_idle,
            sweep_interval: sweep_interval.max(MIN_SWEEP_INTERVAL),
            cancel_token,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    pub async fn watch(&self) -> Result<(), anyhow::Error> {
        info!("Starting editor session sweeper");

        loop {
            if self.cancel_token.is_cancelled() {
                info!("Editor session sweeper received cancellation");
                break;
            }

            let dropped = self.sessions.sweep(self.max_idle).await;
            if dropped > 0 {
                info!("Dropped {} idle editor sessions", dropped);
            }

            tokio::select! {
                _ = sleep(self.sweep_interval) => continue,
                _ = self.cancel_token.cancelled() => {
                    info!("Editor session sweeper cancelled during sleep");
                    break;
                }
            }
        }

        Ok(())
    }
}
