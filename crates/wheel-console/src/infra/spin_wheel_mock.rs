use async_trait::async_trait;
use log::{debug, info};
use rand::Rng;
use serde_json::json;
use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};
use time::OffsetDateTime;
use uuid::Uuid;
use wheel_core::{
    RewardSection, SpinRecord, SpinUser, SpinWheelRef, Wheel, WheelPayload, WheelUpdate,
    WinningSection, WonSection,
};

use super::spin_wheel_api::{Error, SpinWheelApi};

/// A call received by the in-memory backend, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListWheels,
    GetWheel(String),
    CreateWheel(WheelPayload),
    UpdateWheel(String, WheelUpdate),
    DeleteWheel(String),
    Spin(String, u32),
    ListSpinRecords,
}

/// Stand-in for the commerce backend's spin wheel endpoints.
///
/// Keeps wheels and spin records in memory and performs the weighted draw
/// itself. Every call is logged so tests can assert on ordering, and updates
/// to chosen wheels can be made to fail.
#[derive(Clone, Default)]
pub struct InMemorySpinWheelApi {
    wheels: Arc<RwLock<Vec<Wheel>>>,
    records: Arc<RwLock<Vec<SpinRecord>>>,
    calls: Arc<RwLock<Vec<ApiCall>>>,
    failing_updates: Arc<RwLock<HashSet<String>>>,
}

fn object_id() -> String {
    // 24 hex chars, the shape of the backend's ids
    Uuid::now_v7().simple().to_string()[8..].to_string()
}

fn poisoned<T>(_: T) -> Error {
    Error::Request(String::from("in-memory backend lock poisoned"))
}

impl InMemorySpinWheelApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with the given wheels
    pub fn with_wheels(wheels: Vec<Wheel>) -> Self {
        let api = Self::new();
        if let Ok(mut stored) = api.wheels.write() {
            *stored = wheels;
        }
        api
    }

    /// Make every later update of `id` fail with a backend rejection
    pub fn fail_updates_of(&self, id: &str) {
        if let Ok(mut failing) = self.failing_updates.write() {
            failing.insert(id.to_string());
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn wheels(&self) -> Vec<Wheel> {
        self.wheels.read().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn active_count(&self) -> usize {
        self.wheels().iter().filter(|w| w.is_active).count()
    }

    fn record(&self, call: ApiCall) -> Result<(), Error> {
        debug!("in-memory backend: {:?}", call);
        self.calls.write().map_err(poisoned)?.push(call);
        Ok(())
    }

    fn sections_from(payload: &[wheel_core::SectionPayload]) -> Vec<RewardSection> {
        payload
            .iter()
            .map(|s| RewardSection {
                id: Some(object_id()),
                title: s.title.clone(),
                kind: s.kind,
                value: s.value,
                color: s.color.clone(),
                probability: s.probability,
            })
            .collect()
    }
}

/// Pick a section index with chance proportional to its probability
fn draw(sections: &[RewardSection]) -> Option<usize> {
    let total: f64 = sections.iter().map(|s| s.probability.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut point = rand::rng().random_range(0.0..total);
    for (index, section) in sections.iter().enumerate() {
        let weight = section.probability.max(0.0);
        if point < weight {
            return Some(index);
        }
        point -= weight;
    }
    sections.iter().rposition(|s| s.probability > 0.0)
}

#[async_trait]
impl SpinWheelApi for InMemorySpinWheelApi {
    async fn list_wheels(&self) -> Result<Vec<Wheel>, Error> {
        self.record(ApiCall::ListWheels)?;
        Ok(self.wheels.read().map_err(poisoned)?.clone())
    }

    async fn get_wheel(&self, id: &str) -> Result<Wheel, Error> {
        self.record(ApiCall::GetWheel(id.to_string()))?;
        self.wheels
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("spin wheel {} not found", id)))
    }

    async fn create_wheel(&self, payload: WheelPayload) -> Result<Option<Wheel>, Error> {
        self.record(ApiCall::CreateWheel(payload.clone()))?;
        let mut wheels = self.wheels.write().map_err(poisoned)?;
        if wheels.iter().any(|w| w.name == payload.name) {
            return Err(Error::Rejected(String::from(
                "A spin wheel with this name already exists",
            )));
        }

        let wheel = Wheel {
            id: object_id(),
            name: payload.name,
            sections: Self::sections_from(&payload.sections),
            is_active: payload.is_active,
            created_at: Some(OffsetDateTime::now_utc()),
        };
        info!("in-memory backend created wheel {}", wheel.id);
        wheels.push(wheel.clone());
        Ok(Some(wheel))
    }

    async fn update_wheel(&self, id: &str, update: WheelUpdate) -> Result<Option<Wheel>, Error> {
        self.record(ApiCall::UpdateWheel(id.to_string(), update.clone()))?;
        if self.failing_updates.read().map_err(poisoned)?.contains(id) {
            return Err(Error::Rejected(format!("Failed to update wheel {}", id)));
        }

        let mut wheels = self.wheels.write().map_err(poisoned)?;
        let wheel = wheels
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| Error::NotFound(format!("spin wheel {} not found", id)))?;

        if let Some(name) = update.name {
            wheel.name = name;
        }
        if let Some(sections) = update.sections {
            wheel.sections = Self::sections_from(&sections);
        }
        if let Some(is_active) = update.is_active {
            wheel.is_active = is_active;
        }
        Ok(Some(wheel.clone()))
    }

    async fn delete_wheel(&self, id: &str) -> Result<(), Error> {
        self.record(ApiCall::DeleteWheel(id.to_string()))?;
        let mut wheels = self.wheels.write().map_err(poisoned)?;
        let before = wheels.len();
        wheels.retain(|w| w.id != id);
        if wheels.len() == before {
            return Err(Error::NotFound(format!("spin wheel {} not found", id)));
        }
        Ok(())
    }

    async fn spin(&self, id: &str, tokens_to_use: u32) -> Result<WonSection, Error> {
        self.record(ApiCall::Spin(id.to_string(), tokens_to_use))?;
        let wheel = self
            .wheels
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("spin wheel {} not found", id)))?;

        let section = draw(&wheel.sections)
            .and_then(|index| wheel.sections.get(index))
            .ok_or_else(|| Error::Rejected(String::from("Wheel has no winnable sections")))?;

        self.records.write().map_err(poisoned)?.push(SpinRecord {
            id: object_id(),
            user: SpinUser {
                id: String::from("console"),
                name: Some(String::from("Admin test spin")),
                email: None,
            },
            spin_wheel: Some(SpinWheelRef {
                id: wheel.id.clone(),
                name: wheel.name.clone(),
            }),
            winning_section: WinningSection {
                title: section.title.clone(),
                kind: section.kind,
                value: section.value,
            },
            created_at: OffsetDateTime::now_utc(),
        });

        // answer the way the real backend nests it
        let body = json!({ "status": true, "data": { "segment": section } });
        Ok(WonSection::from_spin_body(&body)?)
    }

    async fn list_spin_records(&self) -> Result<Vec<SpinRecord>, Error> {
        self.record(ApiCall::ListSpinRecords)?;
        Ok(self.records.read().map_err(poisoned)?.clone())
    }
}
