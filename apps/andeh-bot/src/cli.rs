use crate::lifecycle::SyncSettings;
use crate::sync::SyncTarget;
use clap::Parser;
use std::path::PathBuf;

/// Discord bot for Andeh's Arsenal.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Push application commands to Discord once the bot is first ready.
    #[arg(short, long)]
    pub sync: bool,

    /// Guild to sync commands to. Repeatable; `-1` or `global` syncs global commands.
    #[arg(short, long = "guild", value_name = "ID", allow_hyphen_values = true)]
    pub guilds: Vec<SyncTarget>,

    /// Env file read at startup and on config reload.
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Template copied to the env file when it does not exist.
    #[arg(long, default_value = ".example.env")]
    pub env_template: PathBuf,
}

impl Args {
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings::new(self.sync, self.guilds.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serenity::all::GuildId;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["andeh-bot"]).unwrap();
        assert!(!args.sync);
        assert!(args.guilds.is_empty());
        assert_eq!(args.env_file, PathBuf::from(".env"));
        assert_eq!(args.sync_settings().active_targets(), None);
    }

    #[test]
    fn guild_flags_accept_the_global_sentinel() {
        let args = Args::try_parse_from([
            "andeh-bot", "--sync", "-g", "-1", "--guild", "100", "-g", "200", "-g", "100",
        ])
        .unwrap();

        assert_eq!(
            args.sync_settings().active_targets(),
            Some(
                &[
                    SyncTarget::Global,
                    SyncTarget::Guild(GuildId::new(100)),
                    SyncTarget::Guild(GuildId::new(200)),
                ][..]
            )
        );
    }

    #[test]
    fn invalid_guild_is_rejected() {
        assert!(Args::try_parse_from(["andeh-bot", "-g", "abc"]).is_err());
    }
}
