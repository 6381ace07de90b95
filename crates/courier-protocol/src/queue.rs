//! Queue naming and per-queue declaration policy.

/// The durable shared queue every relevant inbound event is published to.
pub const INBOX_QUEUE: &str = "inbox";

/// Name of the command queue a given bot instance consumes.
///
/// This is also the `rsvp` value carried in every published envelope, so a
/// stateless consumer can route its answer back to the right instance
/// without shared state.
pub fn command_queue_name(bot_id: &str) -> String {
    format!("discord_{bot_id}")
}

/// Broker-level options a logical queue is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePolicy {
    pub durable: bool,
    pub exclusive: bool,
}

impl QueuePolicy {
    /// The `inbox` binding: survives broker restarts, open to multiple
    /// producers and consumers.
    pub fn durable_shared() -> Self {
        Self {
            durable: true,
            exclusive: false,
        }
    }

    /// The per-bot command binding: ephemeral, single consumer, discarded
    /// when that consumer's connection closes. Commands are only meaningful
    /// while the bot instance that would execute them is live.
    pub fn transient_exclusive() -> Self {
        Self {
            durable: false,
            exclusive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_queue_name_embeds_bot_id() {
        assert_eq!(command_queue_name("1234"), "discord_1234");
    }

    #[test]
    fn inbox_policy_is_durable_and_shared() {
        let policy = QueuePolicy::durable_shared();
        assert!(policy.durable);
        assert!(!policy.exclusive);
    }

    #[test]
    fn command_policy_is_transient_and_exclusive() {
        let policy = QueuePolicy::transient_exclusive();
        assert!(!policy.durable);
        assert!(policy.exclusive);
    }
}
