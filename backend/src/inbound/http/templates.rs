//! Server-side HTML rendering.
//!
//! Templates are compiled into the binary and loaded into one shared
//! minijinja environment on first use. Auto-escaping follows the template
//! extension, so every `.html` template escapes interpolated values.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use minijinja::{Environment, default_auto_escape_callback};
use serde::Serialize;
use tracing::error;

use crate::domain::Error;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/base.html")),
    ("login.html", include_str!("../../../templates/login.html")),
    ("redirect.html", include_str!("../../../templates/redirect.html")),
    ("landing.html", include_str!("../../../templates/landing.html")),
    ("admin.html", include_str!("../../../templates/admin.html")),
    ("performers.html", include_str!("../../../templates/performers.html")),
    ("roles.html", include_str!("../../../templates/roles.html")),
    ("error.html", include_str!("../../../templates/error.html")),
];

const DISPLAY_DATETIME: &str = "%d.%m.%Y %H:%M:%S";

static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    ENGINE.get_or_init(|| {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.add_filter("datetime", format_datetime);
        for &(name, source) in TEMPLATES {
            if let Err(err) = env.add_template(name, source) {
                error!(template = name, error = %err, "failed to compile template");
            }
        }
        env
    })
}

/// Audit timestamps arrive serialized as ISO strings; show them as
/// `dd.mm.yyyy hh:mm:ss`. Missing values render empty.
fn format_datetime(value: Option<String>) -> String {
    let Some(raw) = value else {
        return String::new();
    };
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f").map_or(raw, |parsed| {
        parsed.format(DISPLAY_DATETIME).to_string()
    })
}

/// Render the named template with `context`.
///
/// # Errors
/// Returns an internal error when the template is unknown or rendering fails.
pub fn render<S: Serialize>(name: &str, context: S) -> Result<String, Error> {
    environment()
        .get_template(name)
        .and_then(|template| template.render(context))
        .map_err(|err| Error::internal(format!("failed to render {name}: {err}")))
}

/// Interstitial page that replaces the current history entry and then moves
/// the browser on. Used after login, logout and forced logout so the back
/// button cannot return to an authenticated page.
#[derive(Debug, Clone, Serialize)]
pub struct RedirectPage {
    /// Page title.
    pub title: &'static str,
    /// Text shown while redirecting.
    pub message: &'static str,
    /// Shown when scripts are disabled.
    pub no_script_message: &'static str,
    /// Destination.
    pub target_url: String,
    /// Path the page was served from.
    pub current_url: String,
    /// Placeholder pushed into history before leaving.
    pub temp_url: &'static str,
    /// Milliseconds before the scripted redirect.
    pub delay: u32,
    /// Milliseconds before the meta-refresh fallback.
    pub fallback_delay: u32,
    /// Replace the history entry.
    pub clear_history: bool,
    /// Push a placeholder entry so "back" lands on it.
    pub add_temp_state: bool,
}

impl RedirectPage {
    const NO_SCRIPT: &'static str = "Включите JavaScript для безопасного перехода.";

    /// After a successful login.
    #[must_use]
    pub fn login_success(target_url: &str) -> Self {
        Self {
            title: "Успешный вход",
            message: "Вход выполнен успешно. Выполняется безопасное перенаправление...",
            no_script_message: Self::NO_SCRIPT,
            target_url: target_url.to_owned(),
            current_url: "/auth".to_owned(),
            temp_url: "/logout-temp-redirect",
            delay: 300,
            fallback_delay: 2000,
            clear_history: true,
            add_temp_state: true,
        }
    }

    /// When an authenticated visitor opens the login form.
    #[must_use]
    pub fn already_authenticated(target_url: &str, current_url: &str) -> Self {
        Self {
            title: "Перенаправление",
            message: "Вы уже авторизованы. Выполняется безопасное перенаправление...",
            no_script_message: Self::NO_SCRIPT,
            target_url: target_url.to_owned(),
            current_url: current_url.to_owned(),
            temp_url: "/temp-redirect",
            delay: 100,
            fallback_delay: 3000,
            clear_history: true,
            add_temp_state: false,
        }
    }

    /// After logout, voluntary or forced.
    #[must_use]
    pub fn logout(current_url: &str) -> Self {
        Self {
            title: "Выход из системы",
            message: "Вы вышли из системы. Выполняется безопасное перенаправление на страницу входа...",
            no_script_message: "Включите JavaScript для безопасного выхода.",
            target_url: "/login".to_owned(),
            current_url: current_url.to_owned(),
            temp_url: "/logout-temp-redirect",
            delay: 300,
            fallback_delay: 3000,
            clear_history: true,
            add_temp_state: true,
        }
    }

    /// Render through `redirect.html`.
    ///
    /// # Errors
    /// Returns an internal error when rendering fails.
    pub fn render(&self) -> Result<String, Error> {
        render("redirect.html", self)
    }
}

/// Context for `error.html`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPage<'a> {
    /// Page title.
    pub title: &'static str,
    /// Client-safe message.
    pub message: &'a str,
    /// HTTP status code.
    pub status_code: u16,
    /// Request method.
    pub method: &'a str,
    /// Request path.
    pub path: &'a str,
    /// Correlation id for support requests.
    pub trace_id: Option<&'a str>,
}
