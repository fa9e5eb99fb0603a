use maud::{html, Markup, DOCTYPE};

/// Configuration for admin pages
pub struct AdminPageConfig<'a> {
    pub title: &'a str,
}

/// Base layout for the admin UI, interactivity is all HTMX
pub fn admin_base(config: &AdminPageConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }

                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bulma@0.9.4/css/bulma.min.css";
                script src="https://unpkg.com/htmx.org@1.9.10" {}

                style {
                    r#"
                        .color-swatch {
                            display: inline-block;
                            width: 1.25rem;
                            height: 1.25rem;
                            border-radius: 4px;
                            vertical-align: middle;
                        }
                        .is-projected {
                            opacity: 0.6;
                        }
                        .notification {
                            transition: all 0.3s ease-in-out;
                        }
                        .htmx-request .button.is-primary {
                            pointer-events: none;
                            opacity: 0.7;
                        }
                    "#
                }
            }
            body {
                nav class="navbar is-dark" {
                    div class="navbar-brand" {
                        a class="navbar-item has-text-weight-bold" href="/admin" { (config.title) }
                    }
                }

                // Notifications from any fragment land here via hx-swap-oob
                div id="notifications" class="container mt-4" {}

                div id="admin-content" {
                    (content)
                }
            }
        }
    }
}
