//! Deciding whether an inbound event is worth forwarding at all.

use serenity::client::Context;
use serenity::model::channel::Message;
use serenity::model::id::{GuildId, RoleId, UserId};
use tracing::debug;

/// The three independent signals that make an event relevant.
///
/// Derived once per event and reused verbatim in the published payload,
/// so the consumer sees exactly the evaluation that let the event through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelevanceFlags {
    pub mentions_me: bool,
    pub is_reply_to_me: bool,
    pub mentions_my_role: bool,
}

impl RelevanceFlags {
    /// True when any signal fired.
    pub fn is_relevant(&self) -> bool {
        self.mentions_me || self.is_reply_to_me || self.mentions_my_role
    }

    /// Pure decision core over pre-resolved inputs.
    ///
    /// A self-authored event evaluates to all-false regardless of its
    /// mentions, so the bot can never feed on its own output.
    /// `referenced_author` is the author of the replied-to message when the
    /// event is a reply and that message resolved; `own_roles` is the
    /// bot's current role set in the event's guild. Outside guild context
    /// `own_roles` is empty, which disables only the role signal.
    pub fn evaluate(
        self_id: UserId,
        author_id: UserId,
        mentioned_users: &[UserId],
        referenced_author: Option<UserId>,
        mentioned_roles: &[RoleId],
        own_roles: &[RoleId],
    ) -> Self {
        if author_id == self_id {
            return Self::default();
        }
        Self {
            mentions_me: mentioned_users.contains(&self_id),
            is_reply_to_me: referenced_author == Some(self_id),
            mentions_my_role: mentioned_roles.iter().any(|role| own_roles.contains(role)),
        }
    }
}

/// Resolve the reply and role inputs over the network, then evaluate.
///
/// The referenced message is fetched when the gateway did not inline it,
/// and the bot's role set comes from the guild cache when the member is
/// cached, a member fetch otherwise. Either lookup failing degrades that
/// one signal to false, not the whole evaluation.
pub async fn evaluate_message(ctx: &Context, msg: &Message, self_id: UserId) -> RelevanceFlags {
    if msg.author.id == self_id {
        return RelevanceFlags::default();
    }

    let mentioned_users: Vec<UserId> = msg.mentions.iter().map(|user| user.id).collect();
    let referenced_author = referenced_author(ctx, msg).await;
    let own_roles = match msg.guild_id {
        // Only worth resolving when there are role mentions to test against.
        Some(guild_id) if !msg.mention_roles.is_empty() => {
            own_roles(ctx, guild_id, self_id).await
        }
        _ => Vec::new(),
    };

    RelevanceFlags::evaluate(
        self_id,
        msg.author.id,
        &mentioned_users,
        referenced_author,
        &msg.mention_roles,
        &own_roles,
    )
}

async fn referenced_author(ctx: &Context, msg: &Message) -> Option<UserId> {
    if let Some(referenced) = &msg.referenced_message {
        return Some(referenced.author.id);
    }
    let reference = msg.message_reference.as_ref()?;
    let message_id = reference.message_id?;
    match reference.channel_id.message(&ctx.http, message_id).await {
        Ok(message) => Some(message.author.id),
        Err(error) => {
            debug!(message = %message_id, error = %error, "Could not resolve replied-to message");
            None
        }
    }
}

async fn own_roles(ctx: &Context, guild_id: GuildId, self_id: UserId) -> Vec<RoleId> {
    let cached = ctx
        .cache
        .guild(guild_id)
        .and_then(|guild| guild.members.get(&self_id).map(|member| member.roles.clone()));
    if let Some(roles) = cached {
        return roles;
    }
    match guild_id.member(&ctx.http, self_id).await {
        Ok(member) => member.roles,
        Err(error) => {
            debug!(guild = %guild_id, error = %error, "Could not resolve own guild membership");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn me() -> UserId {
        UserId::new(10)
    }

    fn other() -> UserId {
        UserId::new(20)
    }

    #[test]
    fn self_authored_events_are_never_relevant() {
        let flags = RelevanceFlags::evaluate(
            me(),
            me(),
            &[me()],
            Some(me()),
            &[RoleId::new(1)],
            &[RoleId::new(1)],
        );
        assert_eq!(flags, RelevanceFlags::default());
        assert!(!flags.is_relevant());
    }

    #[test]
    fn direct_mention_is_relevant() {
        let flags = RelevanceFlags::evaluate(me(), other(), &[me()], None, &[], &[]);
        assert!(flags.mentions_me);
        assert!(flags.is_relevant());
    }

    #[test]
    fn reply_to_own_message_is_relevant() {
        let flags = RelevanceFlags::evaluate(me(), other(), &[], Some(me()), &[], &[]);
        assert!(flags.is_reply_to_me);
        assert!(flags.is_relevant());
    }

    #[test]
    fn reply_to_someone_else_is_not() {
        let flags = RelevanceFlags::evaluate(me(), other(), &[], Some(other()), &[], &[]);
        assert!(!flags.is_relevant());
    }

    #[test]
    fn held_role_mention_is_relevant() {
        let shared = RoleId::new(7);
        let flags = RelevanceFlags::evaluate(
            me(),
            other(),
            &[],
            None,
            &[RoleId::new(3), shared],
            &[shared],
        );
        assert!(flags.mentions_my_role);
        assert!(flags.is_relevant());
    }

    #[test]
    fn unheld_role_mention_is_not() {
        let flags = RelevanceFlags::evaluate(
            me(),
            other(),
            &[],
            None,
            &[RoleId::new(3)],
            &[RoleId::new(7)],
        );
        assert!(!flags.is_relevant());
    }

    #[test]
    fn empty_role_set_disables_only_the_role_signal() {
        // Direct-message shape: no guild, so no roles, but an explicit
        // mention still counts.
        let flags =
            RelevanceFlags::evaluate(me(), other(), &[me()], None, &[RoleId::new(3)], &[]);
        assert!(flags.mentions_me);
        assert!(!flags.mentions_my_role);
        assert!(flags.is_relevant());
    }

    #[test]
    fn signals_are_independent() {
        let role = RoleId::new(9);
        let flags =
            RelevanceFlags::evaluate(me(), other(), &[me()], Some(me()), &[role], &[role]);
        assert!(flags.mentions_me && flags.is_reply_to_me && flags.mentions_my_role);
    }
}
