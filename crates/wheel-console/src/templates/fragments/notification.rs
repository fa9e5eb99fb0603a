use maud::{html, Markup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Danger,
}

impl NotificationKind {
    fn class(&self) -> &'static str {
        match self {
            Self::Success => "notification is-success",
            Self::Warning => "notification is-warning",
            Self::Danger => "notification is-danger",
        }
    }
}

/// Dismissable notification
pub fn notification(kind: NotificationKind, message: &str) -> Markup {
    html! {
        div class=(kind.class()) {
            button class="delete" onclick="this.parentElement.remove()" {}
            (message)
        }
    }
}

/// Notification swapped into the page's notification area from any response
pub fn notification_oob(kind: NotificationKind, message: &str) -> Markup {
    html! {
        div id="notifications" class="container mt-4" hx-swap-oob="true" {
            (notification(kind, message))
        }
    }
}
