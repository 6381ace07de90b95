//! Gateway event handling: the inbound half of the bridge.

use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::GetMessages;
use serenity::client::{Context, EventHandler};
use serenity::gateway::ActivityData;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::user::OnlineStatus;
use tracing::{debug, error, info, warn};

use courier_protocol::INBOX_QUEUE;

use crate::broker::Broker;
use crate::credentials::CredentialStore;

use super::normalize::{InboundEvent, history_entry, normalize};
use super::relevance;

/// Upper bound on prior channel messages shipped with each envelope.
const HISTORY_LIMIT: u8 = 100;

/// Bridges gateway events to the broker.
///
/// All collaborators are injected at construction; the handler itself owns
/// no state, so one instance serves the whole session.
pub struct GatewayHandler {
    app_id: String,
    broker: Arc<Broker>,
    credentials: Arc<dyn CredentialStore>,
}

impl GatewayHandler {
    pub fn new(app_id: String, broker: Arc<Broker>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            app_id,
            broker,
            credentials,
        }
    }

    /// Filter, enrich, normalize, and publish one inbound message.
    ///
    /// Irrelevant messages cost at most the relevance lookups. Anything
    /// that fails past the filter is logged and dropped; the next event is
    /// unaffected.
    async fn forward_message(&self, ctx: &Context, msg: &Message) {
        let self_id = ctx.cache.current_user().id;
        let flags = relevance::evaluate_message(ctx, msg, self_id).await;
        if !flags.is_relevant() {
            return;
        }

        let request = GetMessages::new().before(msg.id).limit(HISTORY_LIMIT);
        let history = match msg.channel_id.messages(&ctx.http, request).await {
            Ok(messages) => messages.iter().map(history_entry).collect(),
            Err(error) => {
                warn!(
                    channel = %msg.channel_id,
                    error = %error,
                    "History fetch failed, publishing without history"
                );
                Vec::new()
            }
        };
        let author_roles = author_roles(ctx, msg).await;
        let envelope = normalize(
            InboundEvent::from_message(ctx, msg),
            history,
            &self.app_id,
            flags,
            author_roles,
        );

        if let Err(error) = self.broker.publish(INBOX_QUEUE, &envelope).await {
            error!(message = %msg.id, error = %error, "Failed to publish message to inbox queue");
        }
    }
}

/// The event author's role ids, in the order the platform reports them.
///
/// Guild messages arrive with a partial member attached; when it is
/// missing, fall back to a member fetch. No guild, or a failed fetch,
/// degrades to an empty sequence.
async fn author_roles(ctx: &Context, msg: &Message) -> Vec<String> {
    if let Some(member) = &msg.member {
        return member.roles.iter().map(|role| role.to_string()).collect();
    }
    let Some(guild_id) = msg.guild_id else {
        return Vec::new();
    };
    match guild_id.member(&ctx.http, msg.author.id).await {
        Ok(member) => member.roles.iter().map(|role| role.to_string()).collect(),
        Err(error) => {
            debug!(
                guild = %guild_id,
                author = %msg.author.id,
                error = %error,
                "Could not resolve author membership"
            );
            Vec::new()
        }
    }
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.tag(), "Logged in");
        match self.credentials.presence_text(&self.app_id).await {
            Ok(presence) => {
                ctx.set_presence(presence.map(ActivityData::custom), OnlineStatus::Online);
            }
            Err(error) => warn!(error = %error, "Could not load presence text, leaving presence unset"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        debug!(message = %msg.id, channel = %msg.channel_id, "Message received");
        self.forward_message(&ctx, &msg).await;
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        // No application commands are registered; observed for diagnostics.
        debug!(interaction = %interaction.id(), "Interaction received");
    }
}
