//! Outbound command dispatch: queue payload in, gateway action out.
//!
//! One run per consumed command: validate the envelope, resolve the guild
//! in the live cache, resolve a text-bearing channel inside it, execute.
//! Every rejection is terminal for that command — no retry, no requeue —
//! and acknowledgment is the consumer's unconditional business.

use std::sync::Arc;

use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::channel::ChannelType;
use serenity::model::id::{ChannelId, GuildId};
use thiserror::Error;
use tracing::{debug, info};

use courier_protocol::{CodecError, CommandMethod, OutboundCommand};

use super::chunk::split_message;

/// Channel kinds a command may target. The platform exposes several
/// text-capable kinds, so this is an allow-set rather than a single type.
const ACCEPTED_CHANNEL_KINDS: [ChannelType; 3] = [
    ChannelType::Text,
    ChannelType::News,
    ChannelType::PublicThread,
];

/// Why a consumed command was dropped.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed command payload: {0}")]
    Malformed(#[from] CodecError),

    #[error("`{0}` is not a snowflake id")]
    BadId(String),

    #[error("guild {0} not found in gateway cache")]
    GuildNotFound(GuildId),

    #[error("channel {channel} not found in guild {guild}")]
    ChannelNotFound { guild: GuildId, channel: ChannelId },

    #[error("channel {channel} has kind {kind:?}, which cannot receive messages")]
    UnsupportedChannelKind {
        channel: ChannelId,
        kind: ChannelType,
    },

    #[error("sendMessage command carried no content")]
    NoContent,

    #[error("unknown command method `{0}`")]
    UnknownMethod(String),

    #[error("gateway call failed: {0}")]
    Gateway(#[from] serenity::Error),
}

/// Executes commands consumed from this bot's queue against the live
/// gateway connection.
#[derive(Clone)]
pub struct CommandDispatcher {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl CommandDispatcher {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    /// Run one command through validate → resolve guild → resolve channel
    /// → execute.
    pub async fn dispatch(&self, payload: serde_json::Value) -> Result<(), DispatchError> {
        let command = OutboundCommand::from_value(&payload)?;
        let channel = self.resolve_channel(&command)?;
        self.execute(channel, &command).await
    }

    async fn execute(
        &self,
        channel: ChannelId,
        command: &OutboundCommand,
    ) -> Result<(), DispatchError> {
        match &command.method {
            CommandMethod::SendMessage => {
                self.send_message(channel, command.content.as_deref().unwrap_or_default())
                    .await
            }
            CommandMethod::SendTyping => {
                channel.broadcast_typing(&self.http).await?;
                debug!(channel = %channel, "Sent typing indicator");
                Ok(())
            }
            CommandMethod::Unknown(method) => Err(DispatchError::UnknownMethod(method.clone())),
        }
    }

    /// Chunk `content` and send the chunks strictly in order: each send is
    /// awaited before the next starts, so the platform preserves ordering.
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), DispatchError> {
        let chunks = split_message(content);
        if chunks.is_empty() {
            return Err(DispatchError::NoContent);
        }
        let parts = chunks.len();
        for chunk in chunks {
            channel.say(&self.http, chunk).await?;
        }
        info!(channel = %channel, parts, "Message sent to channel");
        Ok(())
    }

    /// Look the target up in the gateway cache: the guild must be live and
    /// the channel must exist in it — in the channel map or, for threads,
    /// the thread list — with a text-bearing kind.
    fn resolve_channel(&self, command: &OutboundCommand) -> Result<ChannelId, DispatchError> {
        let guild_id = GuildId::new(parse_snowflake(&command.guild_id)?);
        let channel_id = ChannelId::new(parse_snowflake(&command.channel_id)?);
        let guild = self
            .cache
            .guild(guild_id)
            .ok_or(DispatchError::GuildNotFound(guild_id))?;
        let kind = guild
            .channels
            .get(&channel_id)
            .map(|channel| channel.kind)
            .or_else(|| {
                guild
                    .threads
                    .iter()
                    .find(|thread| thread.id == channel_id)
                    .map(|thread| thread.kind)
            })
            .ok_or(DispatchError::ChannelNotFound {
                guild: guild_id,
                channel: channel_id,
            })?;
        if !ACCEPTED_CHANNEL_KINDS.contains(&kind) {
            return Err(DispatchError::UnsupportedChannelKind {
                channel: channel_id,
                kind,
            });
        }
        Ok(channel_id)
    }
}

fn parse_snowflake(raw: &str) -> Result<u64, DispatchError> {
    raw.parse::<u64>()
        .ok()
        .filter(|&id| id != 0)
        .ok_or_else(|| DispatchError::BadId(raw.to_string()))
}
