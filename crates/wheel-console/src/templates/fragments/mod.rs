pub mod notification;

pub use notification::{notification, notification_oob, NotificationKind};
