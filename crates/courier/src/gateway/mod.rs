//! The Discord half of the bridge.
//!
//! Inbound, gateway events flow through the relevance filter and the
//! normalizer before being published to the inbox queue:
//!
//! ```text
//!  messageCreate
//!      │  relevance::evaluate_message()      self-check, mention/reply/role
//!      ▼
//!  history fetch (≤ 100, degrades to empty)
//!      │
//!      ▼
//!  normalize()                               InboundEvent → InboxEnvelope
//!      │
//!      ▼
//!  Broker::publish("inbox", envelope)
//! ```
//!
//! Outbound, payloads consumed from `discord_<appId>` flow through the
//! dispatcher's validate → resolve guild → resolve channel → execute
//! pipeline back into gateway calls, chunked to platform size.

pub mod chunk;
pub mod dispatch;
pub mod handler;
pub mod normalize;
pub mod relevance;

pub use chunk::{MESSAGE_CHUNK_LIMIT, split_message};
pub use dispatch::{CommandDispatcher, DispatchError};
pub use handler::GatewayHandler;
pub use normalize::{InboundEvent, history_entry, normalize};
pub use relevance::RelevanceFlags;
