use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use wheel_core::{ValidatedWheel, Wheel, WheelEditor, WheelUpdate};

use crate::{domain::Error, infra::spin_wheel_api::SpinWheelApi};

/// Behavior when switching off the currently active wheel fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Stop, the target wheel is not written
    #[default]
    Abort,
    /// Log and carry on, two wheels may end up active
    BestEffort,
}

/// Turns validated drafts into persisted wheels
#[derive(Clone)]
pub struct SubmissionGate {
    api: Arc<dyn SpinWheelApi>,
    policy: ActivationPolicy,
}

impl SubmissionGate {
    pub fn new(api: Arc<dyn SpinWheelApi>, policy: ActivationPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> ActivationPolicy {
        self.policy
    }

    /// Validate, persist and record the outcome on the editor.
    ///
    /// An invalid draft never reaches the backend.
    pub async fn submit(&self, editor: &mut WheelEditor) -> Result<Option<Wheel>, Error> {
        let validated = editor.begin_submission()?;
        let result = self.persist(&validated).await;
        editor.complete_submission(&result.as_ref().map_err(Error::user_message));
        result
    }

    /// Create or update the wheel, switching the others off first when it
    /// is meant to be active
    pub async fn persist(&self, wheel: &ValidatedWheel) -> Result<Option<Wheel>, Error> {
        if wheel.payload.is_active {
            self.activate_exclusively(wheel.id.as_deref()).await?;
        }

        let persisted = match &wheel.id {
            Some(id) => {
                info!("updating spin wheel {}", id);
                self.api
                    .update_wheel(id, WheelUpdate::from(wheel.payload.clone()))
                    .await?
            }
            None => {
                info!("creating spin wheel {}", wheel.payload.name);
                self.api.create_wheel(wheel.payload.clone()).await?
            }
        };
        Ok(persisted)
    }

    /// Deactivate every active wheel other than `target`, one at a time.
    /// Returns the ids that were switched off.
    pub async fn activate_exclusively(&self, target: Option<&str>) -> Result<Vec<String>, Error> {
        let wheels = match self.api.list_wheels().await {
            Ok(wheels) => wheels,
            Err(e) if self.policy == ActivationPolicy::BestEffort => {
                warn!("could not list wheels before activation, continuing: {}", e);
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        let mut deactivated = vec![];
        for wheel in wheels
            .iter()
            .filter(|w| w.is_active && Some(w.id.as_str()) != target)
        {
            info!("deactivating spin wheel {} ({})", wheel.name, wheel.id);
            match self
                .api
                .update_wheel(&wheel.id, WheelUpdate::deactivate(wheel))
                .await
            {
                Ok(_) => deactivated.push(wheel.id.clone()),
                Err(e) if self.policy == ActivationPolicy::BestEffort => {
                    warn!(
                        "failed to deactivate spin wheel {}, activating anyway: {}",
                        wheel.id, e
                    );
                }
                Err(e) => {
                    return Err(Error::Deactivation {
                        name: wheel.name.clone(),
                        source: e,
                    })
                }
            }
        }
        Ok(deactivated)
    }
}
