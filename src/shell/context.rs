//! Per-invocation handler context

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::console::Console;
use crate::error::{Error, Result};
use crate::models::{RemoteEndpoint, ShellType};
use crate::shell::arguments::ProvidedArguments;
use crate::shell::dispatcher::{Dispatcher, ExecuteCommandParameters};
use crate::shell::outcome::DispatchOutcome;
use crate::shell::session::ShellSession;
use crate::shell::stack::ShellInstance;

/// Granularity of [`CommandContext::sleep`]
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Everything a handler can see and do while it runs
pub struct CommandContext {
    request: String,
    args: ProvidedArguments,
    shell_type: ShellType,
    token: CancellationToken,
    instance: Arc<ShellInstance>,
    dispatcher: Arc<Dispatcher>,
    remote: Option<RemoteEndpoint>,
}

impl CommandContext {
    pub(crate) fn new(
        request: &str,
        args: ProvidedArguments,
        token: CancellationToken,
        instance: Arc<ShellInstance>,
        dispatcher: Arc<Dispatcher>,
        remote: Option<RemoteEndpoint>,
    ) -> Self {
        Self {
            request: request.to_string(),
            shell_type: instance.shell_type(),
            args,
            token,
            instance,
            dispatcher,
            remote,
        }
    }

    /// Full request text
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Requested command name
    pub fn command(&self) -> &str {
        &self.args.command
    }

    /// Parsed arguments and switches
    pub fn provided(&self) -> &ProvidedArguments {
        &self.args
    }

    /// Positional arguments, unquoted
    pub fn arguments(&self) -> &[String] {
        &self.args.arguments
    }

    /// Positional arguments as typed
    pub fn arguments_text(&self) -> &str {
        &self.args.arguments_text
    }

    pub fn switches(&self) -> &[String] {
        &self.args.switches
    }

    /// Value of a `-key=value` switch, or an empty string
    pub fn switch_value(&self, key: &str) -> String {
        self.args.switch_value(key)
    }

    pub fn has_switch(&self, key: &str) -> bool {
        self.args.has_switch(key)
    }

    pub fn shell_type(&self) -> ShellType {
        self.shell_type
    }

    pub fn console(&self) -> &Console {
        self.dispatcher.console()
    }

    /// Remote peer this command runs for, if any
    pub fn remote(&self) -> Option<&RemoteEndpoint> {
        self.remote.as_ref()
    }

    /// Cancellation token of this command
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Return [`Error::Cancelled`] once the command has been cancelled
    ///
    /// Long-running handlers call this between units of work.
    pub fn checkpoint(&self) -> anyhow::Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled.into());
        }
        Ok(())
    }

    /// Sleep, waking early with [`Error::Cancelled`] on cancellation
    pub fn sleep(&self, duration: Duration) -> anyhow::Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.checkpoint()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }

    /// Run another command in the same shell
    ///
    /// The nested command runs on an alternate worker and is cancelled
    /// together with this one.
    pub fn dispatch(&self, request: &str) -> DispatchOutcome {
        let mut params = ExecuteCommandParameters::new(request, self.shell_type)
            .with_parent_token(self.token.clone());
        if let Some(remote) = &self.remote {
            params = params.with_remote(remote.clone());
        }
        self.dispatcher.dispatch(params)
    }

    /// Enter a nested shell and block until it exits
    pub fn enter_shell(&self, shell_type: ShellType) -> Result<usize> {
        ShellSession::new(self.dispatcher.clone(), shell_type).run()
    }

    /// Leave the current shell once this command returns
    pub fn request_exit(&self) {
        self.instance.request_exit();
    }

    /// Print the listing, or the usage of one command
    pub fn show_help(&self, command: Option<&str>) {
        self.dispatcher.help().show_help(command, self.shell_type);
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("request", &self.request)
            .field("shell_type", &self.shell_type)
            .field("instance", &self.instance.id())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
