use maud::{html, Markup};
use wheel_core::{RecordFilter, SpinRecord, Wheel};

use super::{records::records_panel, wheels::wheels_panel, wheels::WheelRow};
use crate::templates::fragments::{notification, NotificationKind};

/// Landing page: wheel table above the spin records
pub fn admin_dashboard(
    rows: &[WheelRow],
    records: &[SpinRecord],
    filter: &RecordFilter,
    warning: Option<&str>,
) -> Markup {
    let wheels: Vec<Wheel> = rows.iter().map(|row| row.wheel.clone()).collect();
    html! {
        section class="section" {
            div class="container" {
                h1 class="title" { "Spin the Wheel" }
                @if let Some(warning) = warning {
                    (notification(NotificationKind::Warning, warning))
                }
                (wheels_panel(rows, ""))
                (records_panel(records, &wheels, filter))
            }
        }
    }
}
