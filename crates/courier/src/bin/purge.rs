//! courier-purge: one-shot removal of every registered application command.
//!
//! The bridge registers no commands of its own, so bots migrating onto it
//! use this to clear out whatever their previous incarnation registered.
//! Overwrites the global command set with an empty list, and one guild's
//! set when a guild id is given.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use serenity::http::HttpBuilder;
use serenity::model::application::Command;
use serenity::model::id::{ApplicationId, GuildId};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use courier::credentials::{CredentialStore, FileCredentialStore};

#[derive(Debug, Parser)]
#[command(
    name = "courier-purge",
    about = "Purge all registered application commands for a bot"
)]
struct PurgeArgs {
    /// Discord application id to purge commands for.
    #[arg(env = "DISCORD_CLIENT_ID")]
    app_id: String,

    /// Also purge this guild's command set.
    #[arg(long, env = "PURGE_GUILD_ID")]
    guild_id: Option<String>,

    /// YAML credential file mapping application ids to tokens.
    #[arg(long, env = "CREDENTIALS_FILE", default_value = "credentials.yaml")]
    credentials_file: PathBuf,
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|&id| id != 0)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,courier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = PurgeArgs::parse();
    let Some(app_id) = parse_id(&args.app_id) else {
        bail!("`{}` is not a valid application id", args.app_id);
    };

    let credentials = FileCredentialStore::new(&args.credentials_file);
    let token = credentials
        .token(&args.app_id)
        .await?
        .with_context(|| format!("no credentials found for application id {}", args.app_id))?;

    let http = HttpBuilder::new(&token)
        .application_id(ApplicationId::new(app_id))
        .build();

    Command::set_global_commands(&http, vec![])
        .await
        .context("failed to purge global application commands")?;
    info!("All global application commands purged");

    if let Some(raw) = args.guild_id {
        let Some(guild_id) = parse_id(&raw) else {
            bail!("`{raw}` is not a valid guild id");
        };
        GuildId::new(guild_id)
            .set_commands(&http, vec![])
            .await
            .with_context(|| format!("failed to purge application commands for guild {raw}"))?;
        info!(guild = %raw, "Guild application commands purged");
    }
    Ok(())
}
