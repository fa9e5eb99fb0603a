//! Locally held wheel list with optimistic projections

use std::collections::HashSet;

use crate::{wheel_matches, RewardSection, Wheel, WheelUpdate};

/// The wheel list as the console last saw it.
///
/// Updates are projected locally right after they are sent and replaced
/// wholesale by the backend's list on the next refresh.
#[derive(Debug, Clone, Default)]
pub struct WheelBoard {
    wheels: Vec<Wheel>,
    projected: HashSet<String>,
}

impl WheelBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authoritative replacement, drops every projection
    pub fn replace(&mut self, wheels: Vec<Wheel>) {
        self.wheels = wheels;
        self.projected.clear();
    }

    /// Apply an update locally before the backend confirms it.
    /// Returns false when the wheel is not on the board.
    pub fn project_update(&mut self, id: &str, update: &WheelUpdate) -> bool {
        let Some(wheel) = self.wheels.iter_mut().find(|w| w.id == id) else {
            return false;
        };

        if let Some(name) = &update.name {
            wheel.name = name.clone();
        }
        if let Some(sections) = &update.sections {
            wheel.sections = sections
                .iter()
                .map(|s| RewardSection {
                    id: None,
                    title: s.title.clone(),
                    kind: s.kind,
                    value: s.value,
                    color: s.color.clone(),
                    probability: s.probability,
                })
                .collect();
        }
        if let Some(is_active) = update.is_active {
            wheel.is_active = is_active;
        }

        self.projected.insert(id.to_string());
        true
    }

    pub fn project_removal(&mut self, id: &str) -> bool {
        let before = self.wheels.len();
        self.wheels.retain(|w| w.id != id);
        if self.wheels.len() == before {
            return false;
        }
        self.projected.insert(id.to_string());
        true
    }

    /// Whether the wheel carries a local change the backend has not echoed yet
    pub fn is_projected(&self, id: &str) -> bool {
        self.projected.contains(id)
    }

    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    pub fn get(&self, id: &str) -> Option<&Wheel> {
        self.wheels.iter().find(|w| w.id == id)
    }

    pub fn active(&self) -> Option<&Wheel> {
        self.wheels.iter().find(|w| w.is_active)
    }

    /// Active wheels other than `id`
    pub fn active_except<'a>(&'a self, id: Option<&'a str>) -> impl Iterator<Item = &'a Wheel> {
        self.wheels
            .iter()
            .filter(move |w| w.is_active && Some(w.id.as_str()) != id)
    }

    pub fn filtered(&self, search: &str) -> Vec<&Wheel> {
        self.wheels.iter().filter(|w| wheel_matches(w, search)).collect()
    }

    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }
}
