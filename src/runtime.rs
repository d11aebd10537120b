//! Runtime assembly
//!
//! Builds every shared component from a [`Config`] and wires them together:
//! translation catalog, console, registry, shell stack, event bus, access
//! policy, dispatcher and cancellation controller.

use std::sync::Arc;

use crate::completion::CompletionProvider;
use crate::config::Config;
use crate::console::{Console, ConsoleDriver, TerminalDriver};
use crate::error::Result;
use crate::events::EventBus;
use crate::models::ShellType;
use crate::policy::SessionPolicy;
use crate::shell::{CancellationController, CommandRegistry, Dispatcher, ShellSession, ShellStack};
use crate::translation::{Catalog, Translator};

/// All components of a running console
#[derive(Debug)]
pub struct ShellRuntime {
    config: Config,
    registry: Arc<CommandRegistry>,
    events: Arc<EventBus>,
    policy: Arc<SessionPolicy>,
    dispatcher: Arc<Dispatcher>,
    cancellation: Arc<CancellationController>,
}

impl ShellRuntime {
    /// Build a runtime bound to the terminal
    pub fn new(config: Config) -> Result<Self> {
        Self::with_driver(config, Arc::new(TerminalDriver))
    }

    /// Build a runtime over a custom console driver
    pub fn with_driver(config: Config, driver: Arc<dyn ConsoleDriver>) -> Result<Self> {
        let catalog = match &config.translation.catalog {
            Some(path) => {
                let catalog = Catalog::load(path)?;
                info!(
                    "Loaded {} catalog with {} entries",
                    catalog.language(),
                    catalog.len()
                );
                catalog
            }
            None => Catalog::english(),
        };
        let translator: Arc<dyn Translator> = Arc::new(catalog);

        let console = Arc::new(Console::new(driver, translator));
        let registry = Arc::new(CommandRegistry::with_all_shells());
        let events = Arc::new(EventBus::default());
        let stack = Arc::new(ShellStack::new(events.clone()));
        let policy = Arc::new(SessionPolicy::from_config(&config.session));

        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            stack,
            console,
            policy.clone(),
            events.clone(),
            &config,
        ));
        let cancellation = Arc::new(CancellationController::new(&dispatcher));

        debug!("Shell runtime assembled");
        Ok(Self {
            config,
            registry,
            events,
            policy,
            dispatcher,
            cancellation,
        })
    }

    /// Run the main shell until it exits or input ends
    pub fn run(&self) -> Result<usize> {
        self.session(ShellType::Shell).run()
    }

    /// Interactive session for a shell type
    pub fn session(&self, shell_type: ShellType) -> ShellSession {
        ShellSession::new(self.dispatcher.clone(), shell_type)
    }

    /// Completion over this runtime's registry
    pub fn completion(&self) -> CompletionProvider {
        CompletionProvider::new(self.registry.clone())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn policy(&self) -> &Arc<SessionPolicy> {
        &self.policy
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn cancellation(&self) -> &Arc<CancellationController> {
        &self.cancellation
    }
}
