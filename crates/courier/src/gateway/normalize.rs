//! Shaping a raw gateway event into the canonical queue payload.

use chrono::DateTime;
use serenity::client::Context;
use serenity::model::channel::Message;

use courier_protocol::{HistoryEntry, InboxEnvelope, NormalizedMessage, command_queue_name};

use super::relevance::RelevanceFlags;

/// Read-only projection of one gateway message event.
///
/// Every field is an explicit `Option`: a partially-populated event (an
/// author that failed to resolve, a message outside any guild) degrades to
/// absent fields here and null fields on the wire, never to an error.
#[derive(Debug, Clone, Default)]
pub struct InboundEvent {
    pub id: Option<String>,
    pub content: Option<String>,
    pub clean_content: Option<String>,
    pub author_id: Option<String>,
    pub author_username: Option<String>,
    pub author_nickname: Option<String>,
    pub channel_id: Option<String>,
    pub guild_id: Option<String>,
    pub timestamp_millis: Option<i64>,
    pub mentioned_user_ids: Vec<String>,
    pub mentioned_role_ids: Vec<String>,
    pub reply_to_message_id: Option<String>,
}

impl InboundEvent {
    /// Project a serenity message. `clean_content` has mentions resolved
    /// to readable names against the cache; the nickname comes from the
    /// partial member the gateway attaches to guild messages.
    pub fn from_message(ctx: &Context, msg: &Message) -> Self {
        Self {
            id: Some(msg.id.to_string()),
            content: Some(msg.content.clone()),
            clean_content: Some(msg.content_safe(&ctx.cache)),
            author_id: Some(msg.author.id.to_string()),
            author_username: Some(msg.author.name.clone()),
            author_nickname: msg.member.as_ref().and_then(|member| member.nick.clone()),
            channel_id: Some(msg.channel_id.to_string()),
            guild_id: msg.guild_id.map(|id| id.to_string()),
            timestamp_millis: Some(msg.timestamp.timestamp_millis()),
            mentioned_user_ids: msg.mentions.iter().map(|user| user.id.to_string()).collect(),
            mentioned_role_ids: msg.mention_roles.iter().map(|id| id.to_string()).collect(),
            reply_to_message_id: msg
                .message_reference
                .as_ref()
                .and_then(|reference| reference.message_id)
                .map(|id| id.to_string()),
        }
    }
}

/// Reduce one fetched history message to its wire projection.
pub fn history_entry(msg: &Message) -> HistoryEntry {
    HistoryEntry {
        message_id: Some(msg.id.to_string()),
        author_id: Some(msg.author.id.to_string()),
        author_username: Some(msg.author.name.clone()),
        author_nickname: msg.member.as_ref().and_then(|member| member.nick.clone()),
        timestamp: DateTime::from_timestamp_millis(msg.timestamp.timestamp_millis()),
        content: Some(msg.content.clone()),
    }
}

/// Build the envelope published to the inbox queue.
///
/// Pure and infallible: absent inputs stay absent, the timestamp becomes
/// an absolute instant, and the relevance flags are carried through
/// unchanged. History is shipped in whatever order it arrived.
pub fn normalize(
    event: InboundEvent,
    history: Vec<HistoryEntry>,
    self_id: &str,
    flags: RelevanceFlags,
    author_roles: Vec<String>,
) -> InboxEnvelope {
    InboxEnvelope {
        my_id: self_id.to_string(),
        rsvp: command_queue_name(self_id),
        author_roles,
        message: NormalizedMessage {
            id: event.id,
            content: event.content,
            clean_content: event.clean_content,
            author_id: event.author_id,
            author_username: event.author_username,
            author_nickname: event.author_nickname,
            channel_id: event.channel_id,
            guild_id: event.guild_id,
            timestamp: event.timestamp_millis.and_then(DateTime::from_timestamp_millis),
            mentioned_user_ids: event.mentioned_user_ids,
            mentioned_role_ids: event.mentioned_role_ids,
            reply_to_message_id: event.reply_to_message_id,
            mentions_me: flags.mentions_me,
            is_reply_to_me: flags.is_reply_to_me,
            mentions_my_role: flags.mentions_my_role,
        },
        history,
    }
}
