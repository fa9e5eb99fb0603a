use maud::{html, Markup};
use wheel_core::{record_date, DateRange, RecordFilter, SpinRecord, Wheel};

use super::wheels::reward_value;

/// Spin records table with its filters
pub fn records_panel(records: &[SpinRecord], wheels: &[Wheel], filter: &RecordFilter) -> Markup {
    let selected_wheel = filter.wheel.as_deref().unwrap_or_default();
    html! {
        div id="records-panel" class="box" {
            h2 class="title is-4" { "Spin Records" }

            form class="columns"
                 hx-get="/admin/records"
                 hx-trigger="change, keyup changed delay:300ms"
                 hx-target="#record-rows"
                 hx-swap="innerHTML" {
                div class="column is-half" {
                    input class="input" type="search" name="search" value=(filter.search)
                          placeholder="Search by user, wheel, reward or date...";
                }
                div class="column" {
                    div class="select is-fullwidth" {
                        select name="wheel" {
                            option value="" selected[selected_wheel.is_empty()] { "All Wheels" }
                            @for wheel in wheels {
                                option value=(wheel.id) selected[selected_wheel == wheel.id] { (wheel.name) }
                            }
                        }
                    }
                }
                div class="column" {
                    div class="select is-fullwidth" {
                        select name="range" {
                            @for range in DateRange::ALL {
                                option value=(range.as_str()) selected[range == filter.range] { (range.label()) }
                            }
                        }
                    }
                }
            }

            table class="table is-fullwidth is-striped" {
                thead {
                    tr {
                        th { "Date" }
                        th { "User" }
                        th { "Wheel" }
                        th { "Reward" }
                        th { "Type" }
                        th { "Value" }
                    }
                }
                tbody id="record-rows" {
                    (record_rows(records))
                }
            }
        }
    }
}

pub fn record_rows(records: &[SpinRecord]) -> Markup {
    html! {
        @if records.is_empty() {
            tr {
                td colspan="6" class="has-text-centered has-text-grey" { "No spin records found" }
            }
        }
        @for record in records {
            tr {
                td { (record_date(record)) }
                td title=(record.user.id) { (record.user_label()) }
                td { (record.wheel_name()) }
                td { (record.winning_section.title) }
                td { (record.winning_section.kind.label()) }
                td { (reward_value(Some(record.winning_section.kind), record.winning_section.value)) }
            }
        }
    }
}
