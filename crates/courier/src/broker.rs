//! Queue router: a thin publish/consume wrapper over one AMQP channel.
//!
//! Binds logical queue names to broker operations and enforces each
//! queue's durability/exclusivity policy at declaration time. Nothing here
//! retries: a failed publish surfaces to the caller, and a consumed
//! delivery is acked once the handler returns, whatever the handler did.

use std::future::Future;

use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use courier_protocol::QueuePolicy;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker connection failed: {0}")]
    Connect(#[source] lapin::Error),

    #[error("operation on queue `{queue}` failed: {source}")]
    Queue {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("failed to encode payload for queue `{queue}`: {source}")]
    Encode {
        queue: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-wide broker handle: one connection, one channel, reused for
/// every publish and for the command consumer.
pub struct Broker {
    // The channel is only usable while its connection lives.
    _connection: Connection,
    channel: Channel,
}

impl Broker {
    /// Connect to the broker and open the channel all queue operations
    /// run on.
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(BrokerError::Connect)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(BrokerError::Connect)?;
        Ok(Self {
            _connection: connection,
            channel,
        })
    }

    async fn declare(&self, queue: &str, policy: QueuePolicy) -> Result<(), BrokerError> {
        let options = QueueDeclareOptions {
            durable: policy.durable,
            exclusive: policy.exclusive,
            ..QueueDeclareOptions::default()
        };
        self.channel
            .queue_declare(queue, options, FieldTable::default())
            .await
            .map(|_| ())
            .map_err(|source| BrokerError::Queue {
                queue: queue.to_string(),
                source,
            })
    }

    /// Serialize `payload` and enqueue it, declaring the queue durable and
    /// shared first.
    pub async fn publish<T: Serialize>(&self, queue: &str, payload: &T) -> Result<(), BrokerError> {
        self.publish_with(queue, QueuePolicy::durable_shared(), payload)
            .await
    }

    /// [`Broker::publish`] with an explicit declaration policy.
    pub async fn publish_with<T: Serialize>(
        &self,
        queue: &str,
        policy: QueuePolicy,
        payload: &T,
    ) -> Result<(), BrokerError> {
        self.declare(queue, policy).await?;
        let bytes = serde_json::to_vec(payload).map_err(|source| BrokerError::Encode {
            queue: queue.to_string(),
            source,
        })?;
        let confirm = self
            .channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &bytes,
                BasicProperties::default(),
            )
            .await
            .map_err(|source| BrokerError::Queue {
                queue: queue.to_string(),
                source,
            })?;
        confirm.await.map_err(|source| BrokerError::Queue {
            queue: queue.to_string(),
            source,
        })?;
        debug!(queue, bytes = bytes.len(), "Published message");
        Ok(())
    }

    /// Declare `queue` with `policy`, then drive its delivery stream,
    /// invoking `handler` once per message.
    ///
    /// Each delivery is acked after the handler returns, regardless of
    /// what the handler did; failures belong in the handler's own logging.
    /// Runs until the delivery stream ends (connection or queue teardown).
    pub async fn consume<F, Fut>(
        &self,
        queue: &str,
        policy: QueuePolicy,
        handler: F,
    ) -> Result<(), BrokerError>
    where
        F: Fn(Value) -> Fut + Send + Sync,
        Fut: Future<Output = ()> + Send,
    {
        self.declare(queue, policy).await?;
        let mut deliveries = self
            .channel
            .basic_consume(
                queue,
                "",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|source| BrokerError::Queue {
                queue: queue.to_string(),
                source,
            })?;
        debug!(queue, "Consuming queue");

        while let Some(delivery) = deliveries.next().await {
            let delivery = match delivery {
                Ok(delivery) => delivery,
                Err(error) => {
                    warn!(queue, error = %error, "Delivery stream error");
                    continue;
                }
            };
            handler(decode_payload(&delivery.data)).await;
            if let Err(error) = delivery.ack(BasicAckOptions::default()).await {
                warn!(queue, error = %error, "Failed to ack delivery");
            }
        }
        Ok(())
    }
}

/// Decode a delivery body as JSON, degrading to the raw text on failure
/// rather than discarding the message.
pub fn decode_payload(data: &[u8]) -> Value {
    match serde_json::from_slice(data) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(data).into_owned()),
    }
}
