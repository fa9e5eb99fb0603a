use std::sync::Arc;

use log::{info, warn};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;
use wheel_core::{
    EditorAction, RecordFilter, SpinRecord, ValidatedWheel, Wheel, WheelBoard, WheelEditor,
    WheelUpdate, WonSection,
};

use super::{ActivationPolicy, EditorSessions, SubmissionGate};
use crate::{domain::Error, infra::spin_wheel_api::SpinWheelApi};

/// What the console's landing page shows
#[derive(Debug, Default)]
pub struct Overview {
    pub wheels: Vec<Wheel>,
    pub records: Vec<SpinRecord>,
    /// Set when one of the two lists could not be loaded
    pub warning: Option<String>,
}

/// Everything the console does with spin wheels
pub struct SpinWheelService {
    api: Arc<dyn SpinWheelApi>,
    gate: SubmissionGate,
    board: RwLock<WheelBoard>,
    sessions: EditorSessions,
}

impl SpinWheelService {
    pub fn new(api: Arc<dyn SpinWheelApi>, policy: ActivationPolicy) -> Self {
        Self {
            gate: SubmissionGate::new(api.clone(), policy),
            api,
            board: RwLock::new(WheelBoard::new()),
            sessions: EditorSessions::new(),
        }
    }

    pub fn sessions(&self) -> &EditorSessions {
        &self.sessions
    }

    /// Wheels and records fetched side by side
    pub async fn overview(&self) -> Overview {
        let (wheels, records) =
            futures::join!(self.api.list_wheels(), self.api.list_spin_records());

        let mut overview = Overview::default();
        match wheels {
            Ok(wheels) => {
                self.board.write().await.replace(wheels.clone());
                overview.wheels = wheels;
            }
            Err(e) => {
                warn!("failed to fetch spin wheels: {}", e);
                overview.wheels = self.board.read().await.wheels().to_vec();
                overview.warning = Some(e.user_message());
            }
        }
        match records {
            Ok(records) => overview.records = records,
            Err(e) => {
                warn!("failed to fetch spin records: {}", e);
                overview.warning.get_or_insert_with(|| e.user_message());
            }
        }
        overview
    }

    /// Replace the board with the backend's list
    pub async fn refresh_wheels(&self) -> Result<Vec<Wheel>, Error> {
        let wheels = self.api.list_wheels().await?;
        self.board.write().await.replace(wheels.clone());
        Ok(wheels)
    }

    /// Search over the wheels last seen, projections included
    pub async fn search_wheels(&self, search: &str) -> Vec<Wheel> {
        self.board
            .read()
            .await
            .filtered(search)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn is_projected(&self, id: &str) -> bool {
        self.board.read().await.is_projected(id)
    }

    pub async fn get_wheel(&self, id: &str) -> Result<Wheel, Error> {
        Ok(self.api.get_wheel(id).await?)
    }

    /// Delete, then reconcile with the backend whatever the outcome
    pub async fn delete_wheel(&self, id: &str) -> Result<(), Error> {
        self.board.write().await.project_removal(id);
        let deleted = self.api.delete_wheel(id).await;
        self.reconcile().await;
        deleted?;
        info!("deleted spin wheel {}", id);
        Ok(())
    }

    pub async fn test_spin(&self, id: &str, tokens_to_use: u32) -> Result<WonSection, Error> {
        Ok(self.api.spin(id, tokens_to_use).await?)
    }

    pub async fn spin_records(
        &self,
        filter: &RecordFilter,
        now: OffsetDateTime,
    ) -> Result<Vec<SpinRecord>, Error> {
        let records = self.api.list_spin_records().await?;
        Ok(filter.apply(&records, now).into_iter().cloned().collect())
    }

    pub async fn open_new_editor(&self) -> Uuid {
        self.sessions.open(WheelEditor::new()).await
    }

    /// Editor over a fresh copy of the wheel as the backend has it
    pub async fn open_editor_for(&self, id: &str) -> Result<Uuid, Error> {
        let wheel = self.api.get_wheel(id).await?;
        Ok(self.sessions.open(WheelEditor::from_wheel(&wheel)).await)
    }

    pub async fn editor(&self, session: &Uuid) -> Result<WheelEditor, Error> {
        self.sessions.snapshot(session).await
    }

    /// Apply one edit and return the editor as it now stands
    pub async fn apply(&self, session: &Uuid, action: EditorAction) -> Result<WheelEditor, Error> {
        self.sessions
            .with_editor(session, |editor| {
                editor.apply(action);
                editor.clone()
            })
            .await
    }

    pub async fn discard(&self, session: &Uuid) -> bool {
        self.sessions.close(session).await
    }

    /// Submit the session's draft.
    ///
    /// The session lock is only held while validating and while recording
    /// the outcome, never across backend calls. On success the session is
    /// closed; on failure it keeps the draft for a retry.
    pub async fn submit(&self, session: &Uuid) -> Result<Option<Wheel>, Error> {
        let validated = self
            .sessions
            .with_editor(session, |editor| editor.begin_submission())
            .await??;

        let result = self.gate.persist(&validated).await;
        if result.is_ok() {
            self.project_submission(&validated).await;
            self.reconcile().await;
        }

        let outcome = result.as_ref().map_err(Error::user_message);
        if let Err(e) = self
            .sessions
            .with_editor(session, |editor| editor.complete_submission(&outcome))
            .await
        {
            warn!("editor session {} closed during submission: {}", session, e);
        }

        if result.is_ok() {
            self.sessions.close(session).await;
        }
        result
    }

    async fn project_submission(&self, validated: &ValidatedWheel) {
        let mut board = self.board.write().await;
        if validated.payload.is_active {
            let others: Vec<String> = board
                .active_except(validated.id.as_deref())
                .map(|w| w.id.clone())
                .collect();
            let off = WheelUpdate {
                is_active: Some(false),
                ..Default::default()
            };
            for id in others {
                board.project_update(&id, &off);
            }
        }
        if let Some(id) = &validated.id {
            board.project_update(id, &WheelUpdate::from(validated.payload.clone()));
        }
    }

    /// Refetch the list; on failure the local projection stays in place
    async fn reconcile(&self) {
        if let Err(e) = self.refresh_wheels().await {
            warn!("failed to refresh spin wheels, keeping local view: {}", e);
        }
    }
}
