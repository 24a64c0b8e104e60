//! Notification model and dispatch.
//!
//! Renderers in [`render`] turn releases and search results into
//! platform-neutral [`Notification`]s; a [`Notifier`] delivers them.

pub mod render;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

pub use render::RenderStyle;

/// One named entry inside a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A single rich message, independent of the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: u32,
    pub timestamp: Option<DateTime<Utc>>,
    pub fields: Vec<NotificationField>,
    pub footer: Option<String>,
    pub image_url: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            url: None,
            description: None,
            color,
            timestamp: None,
            fields: Vec::new(),
            footer: None,
            image_url: None,
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(NotificationField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Characters counted against the platform's per-message text cap.
    pub fn text_len(&self) -> usize {
        let optional = |text: &Option<String>| text.as_deref().map_or(0, |t| t.chars().count());

        self.title.chars().count()
            + optional(&self.description)
            + optional(&self.footer)
            + self
                .fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
    }
}

/// Delivers notifications to a fixed destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Notifier that writes notifications to the log instead of a channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        log::info!("[{}]", notification.title);
        for field in &notification.fields {
            log::info!("    {}: {}", field.name, field.value.replace('\n', " / "));
        }
        Ok(())
    }
}

/// Send notifications one at a time, in order, pausing `delay` between sends.
///
/// A failed send is logged and the remaining notifications still go out.
/// Returns how many were delivered.
pub async fn dispatch_paced(
    notifier: &dyn Notifier,
    notifications: &[Notification],
    delay: Duration,
) -> usize {
    let mut delivered = 0;
    for (index, notification) in notifications.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match notifier.send(notification).await {
            Ok(()) => {
                delivered += 1;
                log::debug!(
                    "Dispatched notification {}/{} ({} entries)",
                    index + 1,
                    notifications.len(),
                    notification.fields.len()
                );
            }
            Err(e) => log::error!(
                "Failed to dispatch notification {}/{}: {}",
                index + 1,
                notifications.len(),
                e
            ),
        }
    }
    delivered
}
