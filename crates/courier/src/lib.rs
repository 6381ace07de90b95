//! Courier - bridges one Discord bot's gateway session to an AMQP broker.
//!
//! Inbound, relevant chat events are normalized and published to the shared
//! `inbox` queue; outbound, commands consumed from the bot's own transient
//! queue are validated, resolved against the gateway cache, and executed as
//! Discord actions.

pub mod broker;
pub mod config;
pub mod credentials;
pub mod gateway;
