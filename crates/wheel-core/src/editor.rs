//! Section editor for a single wheel draft

use crate::{
    validated, ErrorSet, FieldKey, RewardKind, SectionDraft, SectionField, SubmitRejection,
    ValidatedWheel, Wheel, WheelDraft,
};

/// Shown when the backend failed without saying why
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Where the draft is in its submission lifecycle
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    /// Validation failed, nothing was sent
    Invalid,
    /// Waiting on the backend
    Pending,
    Succeeded,
    Failed(String),
}

impl SubmissionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A typed replacement for one section field
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    Title(String),
    Kind(Option<RewardKind>),
    Value(f64),
    Color(String),
    Probability(f64),
}

impl SectionUpdate {
    /// Build an update from raw form input.
    ///
    /// Numbers that do not parse become NaN so the validator can report them.
    pub fn parse(field: SectionField, raw: &str) -> Self {
        match field {
            SectionField::Title => Self::Title(raw.to_string()),
            SectionField::Kind => Self::Kind(RewardKind::parse(raw)),
            SectionField::Value => Self::Value(parse_number(raw)),
            SectionField::Color => Self::Color(raw.trim().to_string()),
            SectionField::Probability => Self::Probability(parse_number(raw)),
        }
    }

    pub fn field(&self) -> SectionField {
        match self {
            Self::Title(_) => SectionField::Title,
            Self::Kind(_) => SectionField::Kind,
            Self::Value(_) => SectionField::Value,
            Self::Color(_) => SectionField::Color,
            Self::Probability(_) => SectionField::Probability,
        }
    }

    fn apply_to(self, section: &mut SectionDraft) {
        match self {
            Self::Title(title) => section.title = title,
            Self::Kind(kind) => section.kind = kind,
            Self::Value(value) => section.value = value,
            Self::Color(color) => section.color = color,
            Self::Probability(probability) => section.probability = probability,
        }
    }
}

fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// One operator edit, as posted by the console
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    Rename(String),
    SetActive(bool),
    AddSection,
    RemoveSection(usize),
    UpdateField(usize, SectionUpdate),
}

/// Holds a wheel draft, the last validation errors and the submission state
#[derive(Debug, Clone, Default)]
pub struct WheelEditor {
    draft: WheelDraft,
    errors: ErrorSet,
    status: SubmissionStatus,
}

impl WheelEditor {
    /// Editor for a brand new wheel
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor over a deep copy of a persisted wheel
    pub fn from_wheel(wheel: &Wheel) -> Self {
        Self {
            draft: WheelDraft::from(wheel),
            ..Default::default()
        }
    }

    pub fn draft(&self) -> &WheelDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    pub fn add_section(&mut self) {
        let position = self.draft.sections.len();
        self.draft.sections.push(SectionDraft::placeholder(position));
    }

    /// Returns false when `index` is out of range
    pub fn remove_section(&mut self, index: usize) -> bool {
        if index >= self.draft.sections.len() {
            return false;
        }
        self.draft.sections.remove(index);
        self.errors.reindex_after_removal(index);
        true
    }

    /// Replace one field of a section and drop its stale error.
    /// Returns false when `index` is out of range.
    pub fn update_field(&mut self, index: usize, update: SectionUpdate) -> bool {
        let Some(section) = self.draft.sections.get_mut(index) else {
            return false;
        };
        let field = update.field();
        update.apply_to(section);
        self.errors.remove(&FieldKey::section(index, field));
        true
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
        self.errors.remove(&FieldKey::WheelName);
    }

    pub fn set_active(&mut self, active: bool) {
        self.draft.is_active = active;
    }

    /// Returns whether the action changed the draft
    pub fn apply(&mut self, action: EditorAction) -> bool {
        match action {
            EditorAction::Rename(name) => {
                self.rename(name);
                true
            }
            EditorAction::SetActive(active) => {
                self.set_active(active);
                true
            }
            EditorAction::AddSection => {
                self.add_section();
                true
            }
            EditorAction::RemoveSection(index) => self.remove_section(index),
            EditorAction::UpdateField(index, update) => self.update_field(index, update),
        }
    }

    /// Validate the draft and, if it is clean, move to `Pending`.
    ///
    /// An invalid draft is left untouched; only its errors are recorded.
    pub fn begin_submission(&mut self) -> Result<ValidatedWheel, SubmitRejection> {
        if self.status.is_pending() {
            return Err(SubmitRejection::AlreadyPending);
        }

        match validated(&self.draft) {
            Ok(wheel) => {
                self.errors.clear();
                self.status = SubmissionStatus::Pending;
                Ok(wheel)
            }
            Err(errors) => {
                self.errors = errors.clone();
                self.status = SubmissionStatus::Invalid;
                Err(SubmitRejection::Invalid(errors))
            }
        }
    }

    /// Record the backend outcome. The draft is kept either way.
    pub fn complete_submission<T>(&mut self, result: &Result<T, String>) {
        self.status = match result {
            Ok(_) => SubmissionStatus::Succeeded,
            Err(message) if message.trim().is_empty() => {
                SubmissionStatus::Failed(GENERIC_FAILURE.to_string())
            }
            Err(message) => SubmissionStatus::Failed(message.clone()),
        };
    }

    /// Server id of the wheel once it exists
    pub fn wheel_id(&self) -> Option<&str> {
        self.draft.id.as_deref()
    }
}
