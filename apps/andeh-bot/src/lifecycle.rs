//! Startup and ready-event sequencing.

use crate::sync::{sync_commands, CommandSync, SyncReport, SyncTarget};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Uninitialized = 0,
    ConfigLoaded,
    ResourcesOpen,
    Connected,
    FirstReadyComplete,
    Reconnected,
    ShuttingDown,
    Closed,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Uninitialized,
            1 => Self::ConfigLoaded,
            2 => Self::ResourcesOpen,
            3 => Self::Connected,
            4 => Self::FirstReadyComplete,
            5 => Self::Reconnected,
            6 => Self::ShuttingDown,
            _ => Self::Closed,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::ConfigLoaded => "config loaded",
            Self::ResourcesOpen => "resources open",
            Self::Connected => "connected",
            Self::FirstReadyComplete => "ready",
            Self::Reconnected => "reconnected",
            Self::ShuttingDown => "shutting down",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Command sync behaviour requested on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSettings {
    pub sync_on_ready: bool,
    pub targets: Vec<SyncTarget>,
}

impl SyncSettings {
    /// Duplicate targets are dropped, keeping the first occurrence.
    pub fn new(sync_on_ready: bool, targets: impl IntoIterator<Item = SyncTarget>) -> Self {
        let mut unique = Vec::new();
        for target in targets {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        Self {
            sync_on_ready,
            targets: unique,
        }
    }

    /// The targets to sync on first ready, if syncing is enabled at all.
    pub fn active_targets(&self) -> Option<&[SyncTarget]> {
        (self.sync_on_ready && !self.targets.is_empty()).then_some(self.targets.as_slice())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// First ready of the process. `sync` is `None` when syncing was not requested.
    First { sync: Option<SyncReport> },
    Reconnected,
}

pub struct Lifecycle {
    state: AtomicU8,
    first_ready_claimed: AtomicBool,
    settings: SyncSettings,
}

impl Lifecycle {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Uninitialized as u8),
            first_ready_claimed: AtomicBool::new(false),
            settings,
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn advance(&self, next: LifecycleState) {
        let prev = LifecycleState::from_u8(self.state.swap(next as u8, Ordering::AcqRel));
        debug!(from = %prev, to = %next, "Lifecycle transition");
    }

    /// Called for every ready event from the gateway.
    ///
    /// Only the first call runs the first-time work; the claim is a single
    /// compare-and-swap so concurrent callers cannot both win it.
    pub async fn on_ready<S>(&self, syncer: &S, bot_name: &str) -> ReadyOutcome
    where
        S: CommandSync + ?Sized,
    {
        if self
            .first_ready_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(bot = %bot_name, "Bot reconnected to Discord gateway");
            self.advance(LifecycleState::Reconnected);
            return ReadyOutcome::Reconnected;
        }

        let sync = match self.settings.active_targets() {
            Some(targets) => Some(sync_commands(syncer, targets).await),
            None => None,
        };

        // A reconnect or shutdown may have landed while the sync was awaiting;
        // states only move forward.
        let ready = LifecycleState::FirstReadyComplete as u8;
        if self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (raw < ready).then_some(ready)
            })
            .is_ok()
        {
            debug!(to = %LifecycleState::FirstReadyComplete, "Lifecycle transition");
        }
        info!(bot = %bot_name, "Bot is now online");

        ReadyOutcome::First { sync }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MockCommandSync;
    use pretty_assertions::assert_eq;
    use serenity::all::GuildId;

    fn targets() -> Vec<SyncTarget> {
        vec![
            SyncTarget::Global,
            SyncTarget::Guild(GuildId::new(100)),
            SyncTarget::Guild(GuildId::new(200)),
        ]
    }

    #[tokio::test]
    async fn sync_disabled_never_syncs() {
        let mut syncer = MockCommandSync::new();
        syncer.expect_sync_global().never();
        syncer.expect_sync_guild().never();

        let lifecycle = Lifecycle::new(SyncSettings::new(false, targets()));
        let outcome = lifecycle.on_ready(&syncer, "andeh").await;

        assert_eq!(outcome, ReadyOutcome::First { sync: None });
        assert_eq!(lifecycle.state(), LifecycleState::FirstReadyComplete);
    }

    #[tokio::test]
    async fn sync_enabled_without_targets_never_syncs() {
        let mut syncer = MockCommandSync::new();
        syncer.expect_sync_global().never();
        syncer.expect_sync_guild().never();

        let lifecycle = Lifecycle::new(SyncSettings::new(true, []));
        assert_eq!(
            lifecycle.on_ready(&syncer, "andeh").await,
            ReadyOutcome::First { sync: None }
        );
    }

    #[tokio::test]
    async fn first_ready_work_runs_exactly_once() {
        let mut syncer = MockCommandSync::new();
        syncer.expect_sync_global().times(1).returning(|| Ok(3));
        syncer.expect_sync_guild().times(2).returning(|_| Ok(3));

        let lifecycle = Lifecycle::new(SyncSettings::new(true, targets()));

        let first = lifecycle.on_ready(&syncer, "andeh").await;
        let ReadyOutcome::First { sync: Some(report) } = first else {
            panic!("expected a first ready with a sync report, got {first:?}");
        };
        assert_eq!(report.attempted, 3);

        for _ in 0..3 {
            assert_eq!(
                lifecycle.on_ready(&syncer, "andeh").await,
                ReadyOutcome::Reconnected
            );
        }
        assert_eq!(lifecycle.state(), LifecycleState::Reconnected);
    }

    #[test]
    fn settings_drop_duplicate_targets() {
        let settings = SyncSettings::new(
            true,
            [
                SyncTarget::Guild(GuildId::new(1)),
                SyncTarget::Global,
                SyncTarget::Guild(GuildId::new(1)),
                SyncTarget::Global,
            ],
        );
        assert_eq!(
            settings.targets,
            vec![SyncTarget::Guild(GuildId::new(1)), SyncTarget::Global]
        );
    }

    #[test]
    fn states_advance() {
        let lifecycle = Lifecycle::new(SyncSettings::default());
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);
        for state in [
            LifecycleState::ConfigLoaded,
            LifecycleState::ResourcesOpen,
            LifecycleState::Connected,
            LifecycleState::ShuttingDown,
            LifecycleState::Closed,
        ] {
            lifecycle.advance(state);
            assert_eq!(lifecycle.state(), state);
        }
    }
}
