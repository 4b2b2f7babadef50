use crate::extensions::{Extension, ExtensionHost};
use crate::utils::{embeds, format};
use crate::Context;
use async_trait::async_trait;

type Error = crate::error::Error;

/// Everyday commands available to all members.
pub struct General;

#[async_trait]
impl Extension for General {
    fn name(&self) -> &'static str {
        "general"
    }

    async fn load(&self, host: &mut ExtensionHost) -> Result<(), Error> {
        host.add_command(self.name(), ping())?;
        host.add_command(self.name(), about())?;
        host.add_command(self.name(), help())?;
        Ok(())
    }
}

/// Check bot latency.
#[poise::command(slash_command, prefix_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let start = std::time::Instant::now();
    let msg = ctx.say("Pong!").await?;
    let api_latency = start.elapsed().as_millis();

    let embed = embeds::arsenal_embed()
        .title("Pong!")
        .field("API Latency", format!("{api_latency}ms"), true)
        .field("Gateway", format!("{}ms", ctx.ping().await.as_millis()), true);

    msg.edit(ctx, poise::CreateReply::default().content("").embed(embed))
        .await?;

    Ok(())
}

/// Show bot info.
#[poise::command(slash_command, prefix_command)]
pub async fn about(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let version = data.config.read().await.bot_version.clone();

    let embed = embeds::arsenal_embed()
        .title("About AndehBot")
        .description("Discord Bot for Andeh's Arsenal.")
        .field("Version", version, true)
        .field("Uptime", format::uptime(data.start_time.elapsed()), true)
        .field("Language", "Rust + Serenity/Poise", true);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List all available commands.
#[poise::command(slash_command, prefix_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to get help for"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "AndehBot, built with Rust + Poise for Andeh's Arsenal",
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}
