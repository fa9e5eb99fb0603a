use maud::{html, Markup};
use wheel_core::{wheel_date, RewardKind, Wheel, WonSection};

use crate::templates::fragments::{notification, NotificationKind};

/// A wheel as shown in the table
#[derive(Debug, Clone)]
pub struct WheelRow {
    pub wheel: Wheel,
    /// Local change not yet confirmed by the backend
    pub projected: bool,
}

pub fn reward_value(kind: Option<RewardKind>, value: f64) -> String {
    match kind {
        Some(RewardKind::Cash) => format!("₹{}", value),
        Some(RewardKind::Token) => format!("{} tokens", value),
        None => value.to_string(),
    }
}

/// Wheel list with its search box
pub fn wheels_panel(rows: &[WheelRow], search: &str) -> Markup {
    html! {
        div id="wheels-panel" class="box" {
            div class="level" {
                div class="level-left" {
                    div class="level-item" {
                        h2 class="title is-4" { "Spin Wheels" }
                    }
                }
                div class="level-right" {
                    div class="level-item" {
                        input class="input" type="search" name="search" value=(search)
                              placeholder="Search wheels..."
                              hx-get="/admin/wheels/rows"
                              hx-trigger="keyup changed delay:300ms, search"
                              hx-target="#wheel-rows"
                              hx-swap="innerHTML";
                    }
                    div class="level-item" {
                        button class="button is-primary"
                               hx-get="/admin/wheels/new"
                               hx-target="#admin-content"
                               hx-swap="innerHTML" {
                            "Create New Wheel"
                        }
                    }
                }
            }

            table class="table is-fullwidth is-hoverable" {
                thead {
                    tr {
                        th { "ID" }
                        th { "Name" }
                        th { "Sections" }
                        th { "Status" }
                        th { "Created" }
                        th { "Actions" }
                    }
                }
                tbody id="wheel-rows" {
                    (wheel_rows(rows))
                }
            }
            div id="wheel-detail" {}
        }
    }
}

pub fn wheel_rows(rows: &[WheelRow]) -> Markup {
    html! {
        @if rows.is_empty() {
            tr {
                td colspan="6" class="has-text-centered has-text-grey" { "No spin wheels found" }
            }
        }
        @for row in rows {
            (wheel_row(row))
        }
    }
}

fn wheel_row(row: &WheelRow) -> Markup {
    let wheel = &row.wheel;
    html! {
        tr class=[row.projected.then_some("is-projected")] {
            td class="is-family-monospace" title=(wheel.id) { (wheel.short_id()) }
            td { (wheel.name) }
            td { (wheel.sections.len()) }
            td {
                span class=(if wheel.is_active { "tag is-success" } else { "tag" }) {
                    (wheel.status_label())
                }
            }
            td { (wheel_date(wheel).unwrap_or_else(|| String::from("-"))) }
            td {
                div class="buttons are-small" {
                    button class="button is-info is-light"
                           hx-get=(format!("/admin/wheels/{}", wheel.id))
                           hx-target="#wheel-detail"
                           hx-swap="innerHTML" {
                        "View"
                    }
                    button class="button is-link is-light"
                           hx-get=(format!("/admin/wheels/{}/edit", wheel.id))
                           hx-target="#admin-content"
                           hx-swap="innerHTML" {
                        "Edit"
                    }
                    button class="button is-danger is-light"
                           hx-post=(format!("/admin/wheels/{}/delete", wheel.id))
                           hx-confirm=(format!("Delete the wheel \"{}\"?", wheel.name))
                           hx-target="#wheels-panel"
                           hx-swap="outerHTML" {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// Sections of one wheel plus the test spin form
pub fn wheel_detail(wheel: &Wheel) -> Markup {
    let total: f64 = wheel.sections.iter().map(|s| s.probability).sum();
    html! {
        div class="box mt-4" {
            h3 class="title is-5" {
                (wheel.name) " "
                span class=(if wheel.is_active { "tag is-success" } else { "tag" }) {
                    (wheel.status_label())
                }
            }
            table class="table is-fullwidth is-striped" {
                thead {
                    tr {
                        th { "Color" }
                        th { "Title" }
                        th { "Type" }
                        th { "Value" }
                        th { "Probability" }
                    }
                }
                tbody {
                    @for section in &wheel.sections {
                        tr {
                            td {
                                span class="color-swatch" style=(format!("background-color: {}", section.color)) {}
                            }
                            td { (section.title) }
                            td { (section.kind.label()) }
                            td { (reward_value(Some(section.kind), section.value)) }
                            td { (section.probability) "%" }
                        }
                    }
                }
                tfoot {
                    tr {
                        th colspan="4" { "Total" }
                        th { (total) "%" }
                    }
                }
            }

            form class="field has-addons"
                 hx-post=(format!("/admin/wheels/{}/spin", wheel.id))
                 hx-target="#spin-result"
                 hx-swap="innerHTML" {
                div class="control" {
                    input class="input" type="number" name="tokens_to_use" value="1" min="0";
                }
                div class="control" {
                    button class="button is-primary" type="submit" { "Test Spin" }
                }
            }
            div id="spin-result" {}
        }
    }
}

pub fn spin_result(won: &WonSection) -> Markup {
    let mut message = format!("You won: {}", won.title);
    if let Some(value) = won.value {
        message.push_str(&format!(" ({})", reward_value(won.kind, value)));
    }
    html! {
        div class="notification is-success" {
            button class="delete" onclick="this.parentElement.remove()" {}
            @if let Some(color) = &won.color {
                span class="color-swatch mr-2" style=(format!("background-color: {}", color)) {}
            }
            (message)
        }
    }
}

pub fn spin_error(message: &str) -> Markup {
    notification(NotificationKind::Danger, &format!("Test spin failed: {}", message))
}
