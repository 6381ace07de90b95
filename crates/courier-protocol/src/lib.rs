//! Wire types for the Courier queue bridge.
//!
//! Everything that crosses the broker is defined here: the envelope
//! published to the shared `inbox` queue, the command consumed from the
//! per-bot queue, and the queue-naming and durability vocabulary both sides
//! must agree on. External consumers and producers depend on this crate
//! alone; nothing in it touches the network.

mod command;
mod envelope;
mod queue;

pub use command::{CommandMethod, OutboundCommand};
pub use envelope::{HistoryEntry, InboxEnvelope, NormalizedMessage};
pub use queue::{INBOX_QUEUE, QueuePolicy, command_queue_name};

use thiserror::Error;

/// Errors at the encode/decode boundary.
///
/// Decoding rejects shape mismatches here, so nothing malformed ever
/// reaches the dispatcher's resolution steps.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload was valid JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// A required field was absent or carried a non-string value.
    #[error("missing or non-string field `{0}`")]
    MissingField(&'static str),

    /// Envelope serialization failed.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
}
