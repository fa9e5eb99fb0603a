pub mod spin_wheel_api;

// In-memory backend only available with e2e-testing feature or debug builds
#[cfg(any(feature = "e2e-testing", debug_assertions))]
pub mod spin_wheel_mock;
