//! Publishing application commands to Discord, globally or per guild.

use crate::error::Error;
use async_trait::async_trait;
use serenity::all::{Command, CreateCommand, GuildId, Http};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

/// Where commands get pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTarget {
    /// The `-1` sentinel: every guild the bot is in, via global commands.
    Global,
    Guild(GuildId),
}

impl FromStr for SyncTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-1" || s.eq_ignore_ascii_case("global") {
            return Ok(SyncTarget::Global);
        }
        match s.parse::<u64>() {
            Ok(id) if id != 0 => Ok(SyncTarget::Guild(GuildId::new(id))),
            _ => Err(format!("'{s}' is not a guild ID (use -1 for global commands)")),
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTarget::Global => f.write_str("global"),
            SyncTarget::Guild(id) => write!(f, "guild {id}"),
        }
    }
}

/// Pushes the local command set somewhere. Both methods return how many
/// commands the platform now has registered for that scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandSync: Send + Sync {
    async fn sync_global(&self) -> Result<usize, Error>;
    async fn sync_guild(&self, guild_id: GuildId) -> Result<usize, Error>;
}

/// [`CommandSync`] backed by the Discord REST API.
pub struct SerenityCommandSync {
    http: Arc<Http>,
    commands: Vec<CreateCommand>,
}

impl SerenityCommandSync {
    pub fn new<U, E>(http: Arc<Http>, commands: &[poise::Command<U, E>]) -> Self {
        Self {
            http,
            commands: poise::builtins::create_application_commands(commands),
        }
    }
}

#[async_trait]
impl CommandSync for SerenityCommandSync {
    async fn sync_global(&self) -> Result<usize, Error> {
        let synced = Command::set_global_commands(&self.http, self.commands.clone()).await?;
        Ok(synced.len())
    }

    async fn sync_guild(&self, guild_id: GuildId) -> Result<usize, Error> {
        let synced = guild_id
            .set_commands(&self.http, self.commands.clone())
            .await?;
        Ok(synced.len())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub attempted: usize,
    pub synced: Vec<(SyncTarget, usize)>,
    pub failed: Vec<SyncTarget>,
}

/// Push commands to every target once.
///
/// The global sentinel is handled first, then each guild in order. A failed
/// target is logged and skipped; nothing is retried.
pub async fn sync_commands<S>(syncer: &S, targets: &[SyncTarget]) -> SyncReport
where
    S: CommandSync + ?Sized,
{
    let mut report = SyncReport::default();

    if targets.contains(&SyncTarget::Global) {
        report.attempted += 1;
        match syncer.sync_global().await {
            Ok(count) => {
                info!(count, "Synced global commands");
                report.synced.push((SyncTarget::Global, count));
            }
            Err(e) => {
                error!(error = %e, "Failed to sync global application commands");
                report.failed.push(SyncTarget::Global);
            }
        }
    }

    for target in targets {
        let SyncTarget::Guild(guild_id) = *target else {
            continue;
        };
        report.attempted += 1;
        match syncer.sync_guild(guild_id).await {
            Ok(count) => {
                info!(guild_id = %guild_id, count, "Synced guild commands");
                report.synced.push((*target, count));
            }
            Err(e) => {
                error!(guild_id = %guild_id, error = %e, "Failed to sync guild commands");
                report.failed.push(*target);
            }
        }
    }

    report
}
