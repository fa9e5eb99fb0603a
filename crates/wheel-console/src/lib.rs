pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod startup;
pub mod templates;

pub use api::routes::*;
pub use config::*;
pub use domain::{
    ActivationPolicy, EditorSessions, Error as ConsoleError, Overview, SessionSweeper,
    SpinWheelService, SubmissionGate,
};
pub use infra::spin_wheel_api::{Error as ApiError, SpinWheelApi, SpinWheelClient};
#[cfg(any(feature = "e2e-testing", debug_assertions))]
pub use infra::spin_wheel_mock::{ApiCall, InMemorySpinWheelApi};
pub use startup::*;
