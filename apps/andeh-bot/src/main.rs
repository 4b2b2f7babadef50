use andeh_bot::cli::Args;
use andeh_bot::commands;
use andeh_bot::config::{self, Config};
use andeh_bot::error::Error;
use andeh_bot::extensions::{self, ExtensionHost};
use andeh_bot::lifecycle::{Lifecycle, LifecycleState};
use andeh_bot::patterns::PatternRegistry;
use andeh_bot::resources::Resources;
use andeh_bot::shutdown::{self, ShutdownListener};
use andeh_bot::sync::SerenityCommandSync;
use andeh_bot::Data;
use clap::Parser;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("andeh_bot=info")),
        )
        .init();

    match config::ensure_env_file(&args.env_file, &args.env_template) {
        Ok(true) => info!(path = %args.env_file.display(), "Created env file from template"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "Failed to create env file from template"),
    }
    if let Err(e) = dotenvy::from_path(&args.env_file) {
        if !e.not_found() {
            warn!(path = %args.env_file.display(), error = %e, "Failed to read env file");
        }
    }

    let lifecycle = Arc::new(Lifecycle::new(args.sync_settings()));
    info!("Starting bot...");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    lifecycle.advance(LifecycleState::ConfigLoaded);

    // Listen before anything needs closing so a signal can never skip cleanup.
    let signals = shutdown::listen_for_signals();

    let resources = match Resources::open(&config).await {
        Ok(resources) => resources,
        Err(e) => {
            error!(error = %e, "Failed to open HTTP session and database");
            std::process::exit(1);
        }
    };
    lifecycle.advance(LifecycleState::ResourcesOpen);

    let result = shutdown::run_scoped(
        &lifecycle,
        signals.clone(),
        shutdown::GRACE_PERIOD,
        run(
            args,
            config,
            resources.clone(),
            Arc::clone(&lifecycle),
            signals,
        ),
        resources.close(),
    )
    .await;
    info!("Shutdown bot.");

    if let Err(e) = result {
        error!(error = %e, "Bot stopped with an error");
        std::process::exit(1);
    }
}

/// Load extensions, connect to Discord and run until the client stops.
async fn run(
    args: Args,
    config: Config,
    resources: Resources,
    lifecycle: Arc<Lifecycle>,
    signals: ShutdownListener,
) -> Result<(), Error> {
    let mut host = ExtensionHost::new();
    let report = extensions::load_all(
        &mut host,
        commands::mandatory().as_ref(),
        &commands::extensions(),
    )
    .await?;

    if let Some(targets) = lifecycle.settings().active_targets() {
        let targets: Vec<String> = targets.iter().map(ToString::to_string).collect();
        info!(?targets, "Commands will be synced on first ready");
    }

    let token = config.bot_token.clone();
    let owners = config.owner_ids.iter().copied().collect();
    let prefix = config.command_prefix.clone();
    let env_path = args.env_file;
    let data_lifecycle = Arc::clone(&lifecycle);

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: host.into_commands(),
            owners,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Ready { data_about_bot } = event {
                        let syncer = SerenityCommandSync::new(
                            ctx.http.clone(),
                            &framework.options().commands,
                        );
                        data.lifecycle
                            .on_ready(&syncer, &data_about_bot.user.name)
                            .await;
                    }
                    Ok(())
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            let embed = andeh_bot::utils::embeds::error_embed()
                                .title("Error")
                                .description(error.user_message());
                            let _ = ctx
                                .send(poise::CreateReply::default().embed(embed).ephemeral(true))
                                .await;
                            error!(
                                command = ctx.command().name,
                                error = %error,
                                "Command error"
                            );
                        }
                        other => {
                            if let Err(e) = poise::builtins::on_error(other).await {
                                error!(error = %e, "Error handling error");
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |_ctx, ready, _framework| {
            Box::pin(async move {
                info!(bot = %ready.user.name, guilds = ready.guilds.len(), "Connected to Discord");

                Ok(Data {
                    db: resources.db,
                    http: resources.http,
                    config: RwLock::new(config),
                    env_path,
                    patterns: PatternRegistry::new(),
                    lifecycle: data_lifecycle,
                    extensions: report,
                    start_time: std::time::Instant::now(),
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await?;

    // Stop the shards on shutdown so `start` returns and the caller can close up.
    let shard_manager = client.shard_manager.clone();
    let mut stop = signals;
    tokio::spawn(async move {
        shutdown::requested(&mut stop).await;
        shard_manager.shutdown_all().await;
    });

    lifecycle.advance(LifecycleState::Connected);
    client.start().await?;
    Ok(())
}
