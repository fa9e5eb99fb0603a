use maud::{html, Markup};
use uuid::Uuid;
use wheel_core::{
    format_percent, probability_total_ok, FieldKey, RewardKind, SectionDraft, SectionField,
    SubmissionStatus, WheelEditor,
};

use crate::templates::fragments::{notification, NotificationKind};

fn number(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

fn field_error(editor: &WheelEditor, key: FieldKey) -> Markup {
    html! {
        @if let Some(message) = editor.errors().get(&key) {
            p class="help is-danger" { (message) }
        }
    }
}

/// Whole editor, every action re-renders it in place
pub fn editor_panel(session: &Uuid, editor: &WheelEditor) -> Markup {
    let draft = editor.draft();
    let base = format!("/admin/editor/{}", session);
    let total = draft.total_probability();
    let heading = if draft.is_new() {
        "Create New Wheel"
    } else {
        "Edit Wheel"
    };

    html! {
        section id="wheel-editor" class="section" {
            div class="container" {
                h1 class="title" { (heading) }

                (status_notice(editor))

                div class="box" {
                    div class="field" {
                        label class="label" { "Wheel Name" }
                        div class="control" {
                            input class=(if editor.errors().contains(&FieldKey::WheelName) { "input is-danger" } else { "input" })
                                  type="text" name="name" value=(draft.name)
                                  placeholder="Enter wheel name"
                                  hx-post=(format!("{}/name", base))
                                  hx-trigger="change"
                                  hx-target="#wheel-editor"
                                  hx-swap="outerHTML";
                        }
                        (field_error(editor, FieldKey::WheelName))
                    }

                    div class="field" {
                        label class="checkbox" {
                            input type="checkbox" name="is_active" checked[draft.is_active]
                                  hx-post=(format!("{}/active", base))
                                  hx-trigger="change"
                                  hx-target="#wheel-editor"
                                  hx-swap="outerHTML";
                            " Active"
                        }
                    }
                }

                @for (index, section) in draft.sections.iter().enumerate() {
                    (section_box(&base, editor, index, section))
                }
                (field_error(editor, FieldKey::Sections))

                div class="level mt-4" {
                    div class="level-left" {
                        div class="level-item" {
                            button class="button is-link is-light"
                                   hx-post=(format!("{}/sections", base))
                                   hx-target="#wheel-editor"
                                   hx-swap="outerHTML" {
                                "Add Section"
                            }
                        }
                        div class="level-item" {
                            @if probability_total_ok(total) {
                                span class="tag is-success is-medium" { "Total probability: " (format_percent(total)) "%" }
                            } @else {
                                span class="tag is-danger is-medium" { "Total probability: " (format_percent(total)) "%" }
                            }
                        }
                    }
                    div class="level-right" {
                        div class="level-item" {
                            div class="buttons" {
                                button class="button"
                                       hx-post=(format!("{}/discard", base)) {
                                    "Cancel"
                                }
                                button class="button is-primary"
                                       disabled[editor.is_pending()]
                                       hx-post=(format!("{}/submit", base))
                                       hx-target="#wheel-editor"
                                       hx-swap="outerHTML" {
                                    @if draft.is_new() { "Create Wheel" } @else { "Update Wheel" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn status_notice(editor: &WheelEditor) -> Markup {
    html! {
        @match editor.status() {
            SubmissionStatus::Invalid => {
                (notification(NotificationKind::Danger, "Please fix the errors in the form."))
                @if let Some(total) = editor.errors().get(&FieldKey::ProbabilityTotal) {
                    (notification(NotificationKind::Warning, total))
                }
            }
            SubmissionStatus::Failed(message) => {
                (notification(NotificationKind::Danger, message))
            }
            SubmissionStatus::Pending => {
                (notification(NotificationKind::Warning, "Saving..."))
            }
            SubmissionStatus::Succeeded | SubmissionStatus::Idle => {}
        }
    }
}

fn section_box(base: &str, editor: &WheelEditor, index: usize, section: &SectionDraft) -> Markup {
    let field_url = |field: SectionField| format!("{}/sections/{}/{}", base, index, field);
    let input_class = |field: SectionField| {
        if editor.errors().section(index, field).is_some() {
            "input is-danger"
        } else {
            "input"
        }
    };

    html! {
        div class="box" data-section-id=(section.id) {
            div class="level" {
                div class="level-left" {
                    h3 class="subtitle is-6" { "Section " (index + 1) }
                }
                div class="level-right" {
                    button class="button is-small is-danger is-light"
                           hx-post=(format!("{}/sections/{}/remove", base, index))
                           hx-target="#wheel-editor"
                           hx-swap="outerHTML" {
                        "Remove"
                    }
                }
            }
            div class="columns is-multiline" {
                div class="column is-4" {
                    div class="field" {
                        label class="label" { "Title" }
                        input class=(input_class(SectionField::Title)) type="text" name="value"
                              value=(section.title)
                              hx-post=(field_url(SectionField::Title))
                              hx-trigger="change" hx-target="#wheel-editor" hx-swap="outerHTML";
                        (field_error(editor, FieldKey::section(index, SectionField::Title)))
                    }
                }
                div class="column is-2" {
                    div class="field" {
                        label class="label" { "Type" }
                        div class="select is-fullwidth" {
                            select name="value"
                                   hx-post=(field_url(SectionField::Kind))
                                   hx-trigger="change" hx-target="#wheel-editor" hx-swap="outerHTML" {
                                option value="" selected[section.kind.is_none()] { "Select type" }
                                option value="token" selected[section.kind == Some(RewardKind::Token)] { "Token" }
                                option value="cash" selected[section.kind == Some(RewardKind::Cash)] { "Cash" }
                            }
                        }
                        (field_error(editor, FieldKey::section(index, SectionField::Kind)))
                    }
                }
                div class="column is-2" {
                    div class="field" {
                        label class="label" { "Value" }
                        input class=(input_class(SectionField::Value)) type="number" name="value"
                              min="0" step="any" value=(number(section.value))
                              hx-post=(field_url(SectionField::Value))
                              hx-trigger="change" hx-target="#wheel-editor" hx-swap="outerHTML";
                        (field_error(editor, FieldKey::section(index, SectionField::Value)))
                    }
                }
                div class="column is-2" {
                    div class="field" {
                        label class="label" { "Color" }
                        input class=(input_class(SectionField::Color)) type="color" name="value"
                              value=(section.color)
                              hx-post=(field_url(SectionField::Color))
                              hx-trigger="change" hx-target="#wheel-editor" hx-swap="outerHTML";
                        (field_error(editor, FieldKey::section(index, SectionField::Color)))
                    }
                }
                div class="column is-2" {
                    div class="field" {
                        label class="label" { "Probability (%)" }
                        input class=(input_class(SectionField::Probability)) type="number" name="value"
                              min="0" max="100" step="any" value=(number(section.probability))
                              hx-post=(field_url(SectionField::Probability))
                              hx-trigger="change" hx-target="#wheel-editor" hx-swap="outerHTML";
                        (field_error(editor, FieldKey::section(index, SectionField::Probability)))
                    }
                }
            }
        }
    }
}
