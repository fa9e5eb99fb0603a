mod wheels;

use thiserror::Error;
use wheel_core::{SubmitRejection, GENERIC_FAILURE};

pub use wheels::*;

use crate::infra::spin_wheel_api::Error as ApiError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Rejected(#[from] SubmitRejection),
    #[error("could not deactivate wheel {name}: {source}")]
    Deactivation { name: String, source: ApiError },
    #[error("{0}")]
    Backend(#[from] ApiError),
    #[error("background thread died: {0}")]
    Thread(String),
}

impl Error {
    /// Text shown in the console's notifications
    pub fn user_message(&self) -> String {
        match self {
            Error::NotFound(message) | Error::BadRequest(message) => message.clone(),
            Error::Rejected(rejection) => rejection.to_string(),
            Error::Deactivation { name, source } => format!(
                "Could not deactivate the active wheel \"{}\": {}",
                name,
                source.user_message()
            ),
            Error::Backend(source) => source.user_message(),
            Error::Thread(_) => String::from(GENERIC_FAILURE),
        }
    }
}
