//! Spin wheel data model shared by the editor and the console

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::CoreError;

/// Color given to the single section a new wheel starts with
pub const STARTER_SECTION_COLOR: &str = "#FF5733";

/// Colors handed out to added sections, picked by position
pub const PLACEHOLDER_COLORS: [&str; 6] = [
    "#808080", "#33A1FF", "#2ECC71", "#F1C40F", "#9B59B6", "#E67E22",
];

pub const UNKNOWN_REWARD: &str = "Unknown Reward";

/// Unit of a section's reward value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Token,
    Cash,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Cash => "cash",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Token => "Token",
            Self::Cash => "Cash",
        }
    }

    /// Parse operator input; anything other than token/cash is no kind at all
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "token" => Some(Self::Token),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted reward section as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSection {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub value: f64,
    pub color: String,
    /// Percentage chance of this section being drawn
    pub probability: f64,
}

/// A persisted wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wheel {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sections: Vec<RewardSection>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl Wheel {
    /// Last six characters of the id, as shown in tables
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

pub fn short_id(id: &str) -> String {
    let count = id.chars().count();
    id.chars().skip(count.saturating_sub(6)).collect()
}

/// Section as sent to the backend on create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPayload {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub value: f64,
    pub color: String,
    pub probability: f64,
}

impl From<&RewardSection> for SectionPayload {
    fn from(section: &RewardSection) -> Self {
        Self {
            title: section.title.clone(),
            kind: section.kind,
            value: section.value,
            color: section.color.clone(),
            probability: section.probability,
        }
    }
}

/// Body of a create call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelPayload {
    pub name: String,
    pub sections: Vec<SectionPayload>,
    pub is_active: bool,
}

/// Body of an update call, absent fields are left untouched by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl WheelUpdate {
    /// Update that switches `wheel` off while resending its configuration
    pub fn deactivate(wheel: &Wheel) -> Self {
        Self {
            name: Some(wheel.name.clone()),
            sections: Some(wheel.sections.iter().map(SectionPayload::from).collect()),
            is_active: Some(false),
        }
    }
}

impl From<WheelPayload> for WheelUpdate {
    fn from(payload: WheelPayload) -> Self {
        Self {
            name: Some(payload.name),
            sections: Some(payload.sections),
            is_active: Some(payload.is_active),
        }
    }
}

/// Identity of a section inside a draft
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionId {
    /// Client-generated, not yet known to the backend
    Draft(Uuid),
    Persisted(String),
}

impl SectionId {
    pub fn new_draft() -> Self {
        Self::Draft(Uuid::now_v7())
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft(id) => write!(f, "new-{}", id),
            Self::Persisted(id) => f.write_str(id),
        }
    }
}

/// Editable section. Numbers that failed to parse are held as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDraft {
    pub id: SectionId,
    pub title: String,
    pub kind: Option<RewardKind>,
    pub value: f64,
    pub color: String,
    pub probability: f64,
}

impl SectionDraft {
    pub fn starter() -> Self {
        Self::with_color(STARTER_SECTION_COLOR)
    }

    /// Blank section for the given position in the wheel
    pub fn placeholder(position: usize) -> Self {
        Self::with_color(PLACEHOLDER_COLORS[position % PLACEHOLDER_COLORS.len()])
    }

    fn with_color(color: &str) -> Self {
        Self {
            id: SectionId::new_draft(),
            title: String::new(),
            kind: Some(RewardKind::Token),
            value: 0.0,
            color: color.to_string(),
            probability: 0.0,
        }
    }

    pub fn to_payload(&self, index: usize) -> Result<SectionPayload, CoreError> {
        Ok(SectionPayload {
            title: self.title.trim().to_string(),
            kind: self.kind.ok_or(CoreError::MissingKind(index))?,
            value: self.value,
            color: self.color.clone(),
            probability: self.probability,
        })
    }
}

impl From<&RewardSection> for SectionDraft {
    fn from(section: &RewardSection) -> Self {
        Self {
            id: section
                .id
                .clone()
                .map(SectionId::Persisted)
                .unwrap_or_else(SectionId::new_draft),
            title: section.title.clone(),
            kind: Some(section.kind),
            value: section.value,
            color: section.color.clone(),
            probability: section.probability,
        }
    }
}

/// Wheel configuration being created or edited
#[derive(Debug, Clone, PartialEq)]
pub struct WheelDraft {
    /// Server id, `None` until the wheel has been created
    pub id: Option<String>,
    pub name: String,
    pub sections: Vec<SectionDraft>,
    pub is_active: bool,
}

impl Default for WheelDraft {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            sections: vec![SectionDraft::starter()],
            is_active: true,
        }
    }
}

impl WheelDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn total_probability(&self) -> f64 {
        self.sections.iter().map(|s| s.probability).sum()
    }
}

impl From<&Wheel> for WheelDraft {
    fn from(wheel: &Wheel) -> Self {
        Self {
            id: Some(wheel.id.clone()),
            name: wheel.name.clone(),
            sections: wheel.sections.iter().map(SectionDraft::from).collect(),
            is_active: wheel.is_active,
        }
    }
}

/// A user's past spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: SpinUser,
    #[serde(default)]
    pub spin_wheel: Option<SpinWheelRef>,
    pub winning_section: WinningSection,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SpinRecord {
    pub fn user_label(&self) -> &str {
        self.user
            .name
            .as_deref()
            .or(self.user.email.as_deref())
            .unwrap_or("N/A")
    }

    pub fn wheel_name(&self) -> &str {
        self.spin_wheel
            .as_ref()
            .map(|w| w.name.as_str())
            .unwrap_or("N/A")
    }

    pub fn reward_label(&self) -> String {
        match self.winning_section.kind {
            RewardKind::Cash => format!("₹{}", self.winning_section.value),
            RewardKind::Token => self.winning_section.value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinWheelRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningSection {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub value: f64,
}

/// Section selected by the backend's draw for a test spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WonSection {
    #[serde(default = "unknown_reward")]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: Option<RewardKind>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

fn unknown_reward() -> String {
    UNKNOWN_REWARD.to_string()
}

impl WonSection {
    /// Pull the won section out of a spin response body.
    ///
    /// The backend places it under `data.segment`, a top-level `segment`,
    /// or directly as `data`; the first non-null one wins.
    pub fn from_spin_body(body: &Value) -> Result<Self, CoreError> {
        let candidate = [
            body.get("data").and_then(|data| data.get("segment")),
            body.get("segment"),
            body.get("data"),
        ]
        .into_iter()
        .flatten()
        .find(|value| !value.is_null())
        .ok_or(CoreError::MissingSection)?;

        Ok(serde_json::from_value(candidate.clone())?)
    }
}

/// Wrapper every backend response uses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Anything but `status: true` is a failure, described by the server
    /// message when there is one
    pub fn into_data(self, fallback: &str) -> Result<Option<T>, String> {
        if self.status {
            Ok(self.data)
        } else {
            Err(self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()))
        }
    }
}
