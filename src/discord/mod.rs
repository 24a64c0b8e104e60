//! Discord front end.
//!
//! Owns the serenity client, forwards gateway events to [`handler`], parses
//! prefix commands in [`commands`] and posts notifications through
//! [`ChannelNotifier`].

pub mod commands;
pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, Client, CreateEmbed, CreateEmbedFooter, CreateMessage, GatewayIntents, Timestamp,
};
use serenity::http::Http;

use crate::error::Result;
use crate::notify::{Notification, Notifier};
use crate::state::AppState;

use handler::Handler;

/// Notifier posting embeds to one channel.
#[derive(Clone)]
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = CreateMessage::new().embed(to_embed(notification));
        self.channel_id.send_message(&self.http, message).await?;
        Ok(())
    }
}

/// Convert a platform-neutral notification into a Discord embed.
pub fn to_embed(notification: &Notification) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&notification.title)
        .color(notification.color);

    if let Some(url) = &notification.url {
        embed = embed.url(url);
    }
    if let Some(description) = &notification.description {
        embed = embed.description(description);
    }
    for field in &notification.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &notification.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(image) = &notification.image_url {
        embed = embed.image(image);
    }
    if let Some(timestamp) = notification.timestamp {
        match Timestamp::from_unix_timestamp(timestamp.timestamp()) {
            Ok(ts) => embed = embed.timestamp(ts),
            Err(e) => log::warn!("Dropping invalid embed timestamp {}: {}", timestamp, e),
        }
    }

    embed
}

/// Connect to Discord and run until the client shuts down.
///
/// The release monitor is started from the first ready event.
pub async fn start_bot(state: Arc<AppState>, token: &str) -> Result<()> {
    // GUILD_MEMBERS and MESSAGE_CONTENT are privileged intents and must be
    // enabled in the Developer Portal.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler::new(state))
        .await?;

    log::info!("Starting Discord bot...");
    client.start().await?;

    Ok(())
}
