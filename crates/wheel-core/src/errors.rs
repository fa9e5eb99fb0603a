//! Shared error types

use std::{collections::BTreeMap, fmt, str::FromStr};

use thiserror::Error;

/// Core errors shared by the editor and the console
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown section field: {0}")]
    UnknownField(String),

    #[error("section {0} has no reward type")]
    MissingKind(usize),

    #[error("spin response carried no section")]
    MissingSection,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a draft could not enter the pending state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitRejection {
    #[error("a submission is already in progress")]
    AlreadyPending,

    #[error("Please fix the errors in the form.")]
    Invalid(ErrorSet),
}

/// Editable field of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionField {
    Title,
    Kind,
    Value,
    Color,
    Probability,
}

impl SectionField {
    /// Name used in error keys and form routes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Kind => "type",
            Self::Value => "value",
            Self::Color => "color",
            Self::Probability => "probability",
        }
    }
}

impl fmt::Display for SectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "type" | "kind" => Ok(Self::Kind),
            "value" => Ok(Self::Value),
            "color" => Ok(Self::Color),
            "probability" => Ok(Self::Probability),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

/// Location of a validation error inside a wheel draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    WheelName,
    /// The wheel as a whole has no sections
    Sections,
    Section {
        index: usize,
        field: SectionField,
    },
    /// Aggregate probability check across all sections
    ProbabilityTotal,
}

impl FieldKey {
    pub fn section(index: usize, field: SectionField) -> Self {
        Self::Section { index, field }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WheelName => write!(f, "wheelName"),
            Self::Sections => write!(f, "sections"),
            Self::Section { index, field } => write!(f, "section-{}-{}", index, field),
            Self::ProbabilityTotal => write!(f, "probabilityTotal"),
        }
    }
}

/// Field-level validation errors keyed by [`FieldKey`]
///
/// Empty if and only if the draft it was computed from is submittable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorSet {
    errors: BTreeMap<FieldKey, String>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, message: impl Into<String>) {
        self.errors.insert(key, message.into());
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Look up an error by its rendered key, e.g. `section-0-title`
    pub fn get_by_path(&self, path: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(key, _)| key.to_string() == path)
            .map(|(_, message)| message.as_str())
    }

    pub fn section(&self, index: usize, field: SectionField) -> Option<&str> {
        self.get(&FieldKey::section(index, field))
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.errors.contains_key(key)
    }

    pub fn remove(&mut self, key: &FieldKey) -> Option<String> {
        self.errors.remove(key)
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.errors.iter().map(|(key, message)| (key, message.as_str()))
    }

    /// Drop the errors of a removed section and shift later sections down
    pub(crate) fn reindex_after_removal(&mut self, removed: usize) {
        let errors = std::mem::take(&mut self.errors);
        self.errors = errors
            .into_iter()
            .filter_map(|(key, message)| match key {
                FieldKey::Section { index, .. } if index == removed => None,
                FieldKey::Section { index, field } if index > removed => Some((
                    FieldKey::Section {
                        index: index - 1,
                        field,
                    },
                    message,
                )),
                other => Some((other, message)),
            })
            .collect();
    }
}
