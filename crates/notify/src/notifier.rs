use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::mailer::{Email, Mailer};

/// Who gets alerts, and how they are worded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Master switch ("alert admin").
    pub enabled: bool,
    /// Overrides `site_admin_email` when non-blank.
    pub admin_email: String,
    pub site_admin_email: String,
    /// Signature line.
    pub site_title: String,
    pub from_email: String,
    pub subject_prefix: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            admin_email: String::new(),
            site_admin_email: String::new(),
            site_title: String::new(),
            from_email: String::new(),
            subject_prefix: "Fulfillment: ".to_string(),
        }
    }
}

impl AlertSettings {
    /// Override address if set, else the site default.
    pub fn recipient(&self) -> Option<&str> {
        [self.admin_email.trim(), self.site_admin_email.trim()]
            .into_iter()
            .find(|addr| !addr.is_empty())
    }

    fn letter(&self, body: &str) -> String {
        format!("Dear Admin,\n\n{body}\n\nRegards,\n\n{}", self.site_title)
    }
}

/// Best-effort admin alerts.
#[derive(Clone)]
pub struct Notifier {
    settings: AlertSettings,
    mailer: Arc<dyn Mailer>,
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier").field("settings", &self.settings).finish_non_exhaustive()
    }
}

impl Notifier {
    pub fn new(settings: AlertSettings, mailer: Arc<dyn Mailer>) -> Self {
        Self { settings, mailer }
    }

    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    /// Send an alert. Returns whether a message was handed to the mailer.
    ///
    /// Never fails: disabled alerts, a missing recipient and delivery
    /// errors are logged and reported as `false`.
    pub fn warn(&self, subject: &str, body: &str) -> bool {
        if !self.settings.enabled {
            debug!(subject, "admin alerts disabled; not sending");
            return false;
        }

        let Some(to) = self.settings.recipient() else {
            warn!(subject, "no admin address configured; alert dropped");
            return false;
        };

        let email = Email::new(to, format!("{}{}", self.settings.subject_prefix, subject))
            .sender(self.settings.from_email.trim())
            .text(self.settings.letter(body));

        match self.mailer.send(&email) {
            Ok(()) => {
                debug!(to, subject = %email.subject, "admin alert sent");
                true
            }
            Err(e) => {
                error!(to, subject = %email.subject, error = %e, "could not send admin alert");
                false
            }
        }
    }
}
