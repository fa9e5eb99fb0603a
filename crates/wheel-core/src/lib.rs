//! wheel-core: Spin wheel types shared by the admin console
//!
//! Holds the wheel data model, the configuration validator, the section
//! editor and the list/record helpers. Nothing in here performs I/O.

pub mod board;
pub mod editor;
pub mod errors;
pub mod filters;
pub mod types;
pub mod validation;

pub use board::*;
pub use editor::*;
pub use errors::*;
pub use filters::*;
pub use types::*;
pub use validation::*;
