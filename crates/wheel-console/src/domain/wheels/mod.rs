mod gate;
mod service;
mod sessions;

pub use gate::*;
pub use service::*;
pub use sessions::*;
