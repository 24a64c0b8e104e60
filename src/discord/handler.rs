use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serenity::all::{ChannelId, Context, EventHandler, Member, Message, Ready};
use serenity::async_trait;

use crate::discord::ChannelNotifier;
use crate::discord::commands::{self, Command};
use crate::notify::Notifier;
use crate::notify::render::render_welcome;
use crate::state::AppState;

/// Discord gateway event handler
pub struct Handler {
    state: Arc<AppState>,
    monitor_started: AtomicBool,
}

impl Handler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            monitor_started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is connected; starts the release monitor once
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("{} is connected to Discord!", ready.user.name);

        // Reconnects fire ready again.
        if self.monitor_started.swap(true, Ordering::SeqCst) {
            log::debug!("Release monitor already running");
            return;
        }

        let channel_id = ChannelId::new(self.state.config.discord.release_channel_id);
        if let Err(e) = ctx.http.get_channel(channel_id).await {
            log::error!("Release channel not found: {} ({})", channel_id, e);
            return;
        }

        let notifier = Arc::new(ChannelNotifier::new(Arc::clone(&ctx.http), channel_id));
        let monitor = self.state.monitor(notifier);
        tokio::spawn(monitor.run());
        log::info!("Release monitor started for channel {}", channel_id);
    }

    /// Called when a member joins a guild
    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let discord = &self.state.config.discord;
        let channel_id = ChannelId::new(discord.welcome_channel_id);
        let notification = render_welcome(
            &format!("<@{}>", new_member.user.id),
            &discord.welcome_image_url,
            &self.state.style,
        );

        let notifier = ChannelNotifier::new(Arc::clone(&ctx.http), channel_id);
        match notifier.send(&notification).await {
            Ok(()) => log::info!("Welcomed {}", new_member.user.name),
            Err(e) => log::error!("Failed to send welcome message: {}", e),
        }
    }

    /// Called when a message is sent in a channel
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(command) = Command::parse(&self.state.config.discord.prefix, &msg.content) else {
            return;
        };

        let name = command.name();
        if let Err(e) = commands::execute(&ctx, &msg, &self.state, command).await {
            log::error!("Command {} failed: {}", name, e);
            if let Err(e) = msg
                .channel_id
                .say(&ctx.http, "❌ Something went wrong. Please try again later.")
                .await
            {
                log::error!("Failed to report command error: {}", e);
            }
        }
    }
}
