//! courier-discord: run one bot's gateway session bridged to the broker.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use serenity::Client;
use serenity::model::gateway::GatewayIntents;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use courier::broker::Broker;
use courier::config::Config;
use courier::credentials::{CredentialStore, FileCredentialStore};
use courier::gateway::{CommandDispatcher, GatewayHandler};
use courier_protocol::QueuePolicy;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,courier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(&config.credentials_file));
    let token = credentials
        .token(&config.app_id)
        .await?
        .with_context(|| format!("no credentials found for application id {}", config.app_id))?;

    let broker = Arc::new(
        Broker::connect(&config.amqp_url())
            .await
            .context("broker connection failed")?,
    );
    info!(host = %config.mq_host, "Connected to broker");

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let handler = GatewayHandler::new(config.app_id.clone(), broker.clone(), credentials);
    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .context("failed to build gateway client")?;

    // The command consumer runs for the life of the process; its queue is
    // exclusive, so it dies with this connection and takes the queue along.
    let dispatcher = CommandDispatcher::new(client.http.clone(), client.cache.clone());
    let queue = config.command_queue();
    info!(queue = %queue, "Starting command consumer");
    tokio::spawn(async move {
        let outcome = broker
            .consume(&queue, QueuePolicy::transient_exclusive(), move |payload| {
                let dispatcher = dispatcher.clone();
                async move {
                    if let Err(error) = dispatcher.dispatch(payload).await {
                        warn!(error = %error, "Dropping command");
                    }
                }
            })
            .await;
        if let Err(error) = outcome {
            error!(error = %error, "Command consumer stopped");
        }
    });

    client
        .start()
        .await
        .context("gateway session ended with an error")?;
    Ok(())
}
