//! Owner-only debugging and maintenance commands.
//!
//! This extension is mandatory: the bot refuses to start without it.

use crate::db;
use crate::extensions::{Extension, ExtensionHost};
use crate::sync::{sync_commands, SerenityCommandSync, SyncTarget};
use crate::utils::{embeds, format};
use crate::Context;
use async_trait::async_trait;
use tracing::{info, warn};

type Error = crate::error::Error;

pub struct DebugTools;

#[async_trait]
impl Extension for DebugTools {
    fn name(&self) -> &'static str {
        "debug"
    }

    async fn load(&self, host: &mut ExtensionHost) -> Result<(), Error> {
        host.add_command(self.name(), debug())
    }
}

/// Owner-only maintenance commands.
#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    hide_in_help,
    subcommands("status", "sync", "reload", "shutdown"),
    subcommand_required
)]
pub async fn debug(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show runtime state: lifecycle, extensions and database health.
#[poise::command(slash_command, prefix_command, owners_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let report = &data.extensions;

    let database = match db::ping(&data.db).await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            format!("unavailable ({e})")
        }
    };

    let mut extensions = format!("{}/{} loaded", report.loaded, report.attempted);
    if !report.failed.is_empty() {
        extensions.push_str(&format!("\nFailed: {}", report.failed.join(", ")));
    }

    let embed = embeds::debug_embed()
        .title("Status")
        .field("Lifecycle", data.lifecycle.state().to_string(), true)
        .field("Uptime", format::uptime(data.start_time.elapsed()), true)
        .field("Guilds", ctx.cache().guild_count().to_string(), true)
        .field("Extensions", extensions, false)
        .field("Database", database, false);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Push application commands to this guild, or globally.
#[poise::command(slash_command, prefix_command, owners_only)]
pub async fn sync(
    ctx: Context<'_>,
    #[description = "Sync global commands instead of this guild's"]
    #[flag]
    global: bool,
) -> Result<(), Error> {
    let target = match (global, ctx.guild_id()) {
        (false, Some(guild_id)) => SyncTarget::Guild(guild_id),
        _ => SyncTarget::Global,
    };

    ctx.defer_ephemeral().await?;

    let syncer = SerenityCommandSync::new(
        ctx.serenity_context().http.clone(),
        &ctx.framework().options().commands,
    );
    let report = sync_commands(&syncer, &[target]).await;

    let embed = match report.synced.first() {
        Some((_, count)) => embeds::success_embed()
            .title("Synced")
            .description(format!("Synced {count} commands ({target}).")),
        None => embeds::error_embed()
            .title("Sync failed")
            .description(format!("Could not sync commands ({target}). Check the logs.")),
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Re-read the env file and reload configuration.
#[poise::command(slash_command, prefix_command, owners_only)]
pub async fn reload(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();

    let result = data.config.write().await.reload(&data.env_path);

    let embed = match result {
        Ok(()) => {
            info!("Configuration reloaded");
            embeds::success_embed()
                .title("Reloaded")
                .description("Configuration reloaded. Token and database changes apply on restart.")
        }
        Err(e) => {
            warn!(error = %e, "Configuration reload failed, keeping previous configuration");
            embeds::error_embed()
                .title("Reload failed")
                .description(format!("{e}\nThe previous configuration is still in use."))
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Disconnect from Discord and shut the bot down.
#[poise::command(slash_command, prefix_command, owners_only)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    info!(user = %ctx.author().name, "Shutdown requested");
    ctx.send(
        poise::CreateReply::default()
            .embed(embeds::warning_embed().title("Shutting down"))
            .ephemeral(true),
    )
    .await?;

    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn registers_a_single_parent_command() {
        let mut host = ExtensionHost::new();
        DebugTools.load(&mut host).await.unwrap();

        let commands = host.into_commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].owners_only);

        let subcommands: Vec<_> = commands[0]
            .subcommands
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(subcommands, vec!["status", "sync", "reload", "shutdown"]);
    }
}
