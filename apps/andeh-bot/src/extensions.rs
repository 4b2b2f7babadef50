//! Loading extensions: independently loadable bundles of commands.

use crate::error::Error;
use crate::Data;
use async_trait::async_trait;
use tracing::{error, info};

pub type BotCommand = poise::Command<Data, Error>;

/// A loadable unit of bot functionality.
#[async_trait]
pub trait Extension: Send + Sync {
    fn name(&self) -> &'static str;

    /// Register everything this extension provides into `host`.
    async fn load(&self, host: &mut ExtensionHost) -> Result<(), Error>;
}

/// Collects what extensions register before the framework is built.
#[derive(Default)]
pub struct ExtensionHost {
    commands: Vec<BotCommand>,
}

impl ExtensionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level command. Names must be unique across all extensions.
    pub fn add_command(&mut self, owner: &'static str, command: BotCommand) -> Result<(), Error> {
        if self.commands.iter().any(|c| c.name == command.name) {
            return Err(Error::Extension {
                name: owner,
                reason: format!("command '{}' is already registered", command.name),
            });
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    pub fn into_commands(self) -> Vec<BotCommand> {
        self.commands
    }

    async fn load_isolated(&mut self, extension: &dyn Extension) -> Result<(), Error> {
        let checkpoint = self.commands.len();
        let result = extension.load(self).await;
        if result.is_err() {
            self.commands.truncate(checkpoint);
        }
        result
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub attempted: usize,
    pub failed: Vec<&'static str>,
}

/// Load `mandatory` and then every extension in `extensions`, in order.
///
/// A failure of the mandatory extension is returned as
/// [`Error::MandatoryExtension`]. Any other failure is logged and the loop
/// moves on to the next extension.
pub async fn load_all(
    host: &mut ExtensionHost,
    mandatory: &dyn Extension,
    extensions: &[Box<dyn Extension>],
) -> Result<LoadReport, Error> {
    if let Err(e) = host.load_isolated(mandatory).await {
        return Err(Error::MandatoryExtension {
            name: mandatory.name(),
            source: Box::new(e),
        });
    }

    let mut report = LoadReport {
        loaded: 1,
        attempted: 1,
        failed: Vec::new(),
    };

    for extension in extensions {
        report.attempted += 1;
        match host.load_isolated(extension.as_ref()).await {
            Ok(()) => report.loaded += 1,
            Err(e) => {
                error!(extension = extension.name(), error = %e, "Failed to load extension");
                report.failed.push(extension.name());
            }
        }
    }

    info!(
        loaded = report.loaded,
        attempted = report.attempted,
        "Successfully loaded {}/{} extensions",
        report.loaded,
        report.attempted
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<&'static str>>>;

    struct Fake {
        name: &'static str,
        commands: &'static [&'static str],
        fail: bool,
        calls: Calls,
    }

    impl Fake {
        fn boxed(
            name: &'static str,
            commands: &'static [&'static str],
            fail: bool,
            calls: &Calls,
        ) -> Box<dyn Extension> {
            Box::new(Fake {
                name,
                commands,
                fail,
                calls: calls.clone(),
            })
        }
    }

    #[async_trait]
    impl Extension for Fake {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn load(&self, host: &mut ExtensionHost) -> Result<(), Error> {
            self.calls.lock().unwrap().push(self.name);
            for command in self.commands {
                host.add_command(
                    self.name,
                    BotCommand {
                        name: command.to_string(),
                        ..Default::default()
                    },
                )?;
            }
            if self.fail {
                return Err(Error::Extension {
                    name: self.name,
                    reason: "boom".into(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let calls = Calls::default();
        let debug = Fake {
            name: "debug",
            commands: &["debug"],
            fail: false,
            calls: calls.clone(),
        };
        let extensions = vec![
            Fake::boxed("a", &["a"], false, &calls),
            Fake::boxed("b", &["b"], true, &calls),
            Fake::boxed("c", &["c"], false, &calls),
        ];

        let mut host = ExtensionHost::new();
        let report = load_all(&mut host, &debug, &extensions).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["debug", "a", "b", "c"]);
        assert_eq!(
            report,
            LoadReport {
                loaded: 3,
                attempted: 4,
                failed: vec!["b"],
            }
        );
        assert_eq!(host.command_names().collect::<Vec<_>>(), vec!["debug", "a", "c"]);
    }

    #[tokio::test]
    async fn duplicate_command_names_fail_the_later_extension() {
        let calls = Calls::default();
        let debug = Fake {
            name: "debug",
            commands: &[],
            fail: false,
            calls: calls.clone(),
        };
        let extensions = vec![
            Fake::boxed("first", &["ping"], false, &calls),
            Fake::boxed("second", &["pong", "ping"], false, &calls),
        ];

        let mut host = ExtensionHost::new();
        let report = load_all(&mut host, &debug, &extensions).await.unwrap();

        assert_eq!(report.failed, vec!["second"]);
        // "pong" was registered before the clash and must not survive it.
        assert_eq!(host.command_names().collect::<Vec<_>>(), vec!["ping"]);
    }

    #[tokio::test]
    async fn mandatory_failure_is_fatal() {
        let calls = Calls::default();
        let debug = Fake {
            name: "debug",
            commands: &[],
            fail: true,
            calls: calls.clone(),
        };
        let extensions = vec![Fake::boxed("a", &["a"], false, &calls)];

        let mut host = ExtensionHost::new();
        let err = load_all(&mut host, &debug, &extensions).await.unwrap_err();

        assert!(matches!(err, Error::MandatoryExtension { name: "debug", .. }));
        assert_eq!(*calls.lock().unwrap(), vec!["debug"]);
    }
}
