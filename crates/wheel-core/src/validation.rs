//! Wheel configuration validation

use crate::{ErrorSet, FieldKey, SectionField, WheelDraft, WheelPayload};

/// Required sum of all section probabilities
pub const PROBABILITY_TOTAL: f64 = 100.0;

/// Slack allowed on the probability sum.
///
/// Covers floating point summation error only: 33.33 + 33.33 + 33.34 passes,
/// three sections of 33.33 do not.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// A draft that passed validation, ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWheel {
    /// Server id when the draft edits an existing wheel
    pub id: Option<String>,
    pub payload: WheelPayload,
}

/// Check a draft against every wheel invariant.
///
/// Each check is independent, so one section can collect several errors.
/// The aggregate probability check is skipped for an empty wheel and when
/// any probability is not a number, those cases already carry their own
/// error.
pub fn validate(draft: &WheelDraft) -> ErrorSet {
    let mut errors = ErrorSet::new();

    if draft.name.trim().is_empty() {
        errors.insert(FieldKey::WheelName, "Wheel Name is required.");
    }

    if draft.sections.is_empty() {
        errors.insert(FieldKey::Sections, "A wheel needs at least one section.");
    }

    for (index, section) in draft.sections.iter().enumerate() {
        if section.title.trim().is_empty() {
            errors.insert(
                FieldKey::section(index, SectionField::Title),
                "Title is required.",
            );
        }

        if section.kind.is_none() {
            errors.insert(
                FieldKey::section(index, SectionField::Kind),
                "Type is required.",
            );
        }

        if !section.value.is_finite() {
            errors.insert(
                FieldKey::section(index, SectionField::Value),
                "Value must be a valid number.",
            );
        } else if section.value < 0.0 {
            errors.insert(
                FieldKey::section(index, SectionField::Value),
                "Value cannot be negative.",
            );
        }

        if section.color.trim().is_empty() {
            errors.insert(
                FieldKey::section(index, SectionField::Color),
                "Color is required.",
            );
        }

        if !section.probability.is_finite() {
            errors.insert(
                FieldKey::section(index, SectionField::Probability),
                "Probability must be a valid number.",
            );
        } else if !(0.0..=100.0).contains(&section.probability) {
            errors.insert(
                FieldKey::section(index, SectionField::Probability),
                "Probability must be between 0 and 100.",
            );
        }
    }

    let all_numeric = draft.sections.iter().all(|s| s.probability.is_finite());
    if !draft.sections.is_empty() && all_numeric {
        let total = draft.total_probability();
        if !probability_total_ok(total) {
            errors.insert(
                FieldKey::ProbabilityTotal,
                format!(
                    "Total probability must be 100%. Current total: {}%",
                    format_percent(total)
                ),
            );
        }
    }

    errors
}

/// Percentage for display: at most two decimals, `-` when not a number
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return String::from("-");
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => String::from("0"),
        other => other.to_string(),
    }
}

pub fn probability_total_ok(total: f64) -> bool {
    (total - PROBABILITY_TOTAL).abs() <= PROBABILITY_TOLERANCE
}

/// Validate a draft and build the payload the backend expects
pub fn validated(draft: &WheelDraft) -> Result<ValidatedWheel, ErrorSet> {
    let errors = validate(draft);
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut sections = Vec::with_capacity(draft.sections.len());
    for (index, section) in draft.sections.iter().enumerate() {
        match section.to_payload(index) {
            Ok(payload) => sections.push(payload),
            Err(e) => {
                let mut errors = ErrorSet::new();
                errors.insert(FieldKey::section(index, SectionField::Kind), e.to_string());
                return Err(errors);
            }
        }
    }

    Ok(ValidatedWheel {
        id: draft.id.clone(),
        payload: WheelPayload {
            name: draft.name.trim().to_string(),
            sections,
            is_active: draft.is_active,
        },
    })
}
