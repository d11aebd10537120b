//! Test Fixtures
//!
//! A runtime over an in-memory console plus helpers for commands that
//! record how they were called.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use shellstack::console::MemoryDriver;
use shellstack::events::EventEnvelope;
use shellstack::shell::ShellInstance;
use shellstack::{CommandInfo, Config, DispatchOutcome, ShellRuntime, ShellType};
use tokio::sync::broadcast;

/// Configuration with short grace and poll intervals
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.dispatch.cancel_grace_ms = 300;
    config.dispatch.wait_poll_ms = 5;
    config
}

/// Argument lists seen by a recording command, one entry per call
pub type CallLog = Arc<Mutex<Vec<Vec<String>>>>;

/// Command that records its positional arguments and returns 0
pub fn recording_command(name: &str, description: &str) -> (CommandInfo, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let log = calls.clone();
    let info = CommandInfo::from_fn(name, description, move |ctx| {
        log.lock().push(ctx.arguments().to_vec());
        Ok(0)
    });
    (info, calls)
}

/// Runtime with a memory console and an event subscription
pub struct TestHarness {
    pub runtime: ShellRuntime,
    pub driver: Arc<MemoryDriver>,
    pub events: broadcast::Receiver<EventEnvelope>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(create_test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let driver = Arc::new(MemoryDriver::new());
        let runtime = ShellRuntime::with_driver(config, driver.clone()).unwrap();
        let events = runtime.events().subscribe();
        Self {
            runtime,
            driver,
            events,
        }
    }

    /// Push an instance of `shell_type` without starting a session loop
    pub fn enter(&self, shell_type: ShellType) -> Arc<ShellInstance> {
        let dispatcher = self.runtime.dispatcher();
        dispatcher
            .stack()
            .push(shell_type, dispatcher.config().clone())
            .unwrap()
    }

    pub fn add(&self, shell_type: ShellType, info: CommandInfo) {
        self.runtime.registry().add_command(shell_type, info).unwrap();
    }

    pub fn dispatch(&self, request: &str, shell_type: ShellType) -> DispatchOutcome {
        self.runtime.dispatcher().dispatch_line(request, shell_type)
    }

    /// Events published so far that have not been drained yet
    pub fn drain_events(&mut self) -> Vec<EventEnvelope> {
        std::iter::from_fn(|| self.events.try_recv().ok()).collect()
    }

    /// Wait until `condition` holds, failing the test after two seconds
    pub fn wait_for<F>(&self, what: &str, condition: F)
    where
        F: Fn() -> bool,
    {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !condition() {
            assert!(std::time::Instant::now() < deadline, "timed out waiting for {}", what);
            std::thread::sleep(Duration::from_millis(2));
        }
    }
}
