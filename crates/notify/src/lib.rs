//! Admin notifications.
//!
//! The [`Notifier`] is the single sink for operator-facing alerts. It never
//! fails: delivery problems are logged and swallowed so they cannot hide the
//! failure being reported.

pub mod mailer;
pub mod notifier;

pub use mailer::{Email, InMemoryMailer, LogMailer, MailError, Mailer};
pub use notifier::{AlertSettings, Notifier};
