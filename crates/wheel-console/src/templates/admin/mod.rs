pub mod dashboard;
pub mod editor;
pub mod records;
pub mod wheels;

pub use dashboard::admin_dashboard;
pub use editor::editor_panel;
pub use records::{record_rows, records_panel};
pub use wheels::{spin_error, spin_result, wheel_detail, wheel_rows, wheels_panel, WheelRow};
