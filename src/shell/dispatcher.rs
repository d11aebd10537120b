//! Command dispatch
//!
//! Turns one request into exactly one [`DispatchOutcome`]. The dispatcher
//! resolves the command, applies the access policy, hands the request to a
//! worker of the target shell instance and reports the result. Nothing a
//! handler does escapes `dispatch`: errors and panics become `Faulted`,
//! cancellation becomes `Cancelled`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::ansi::ColorRole;
use crate::config::{Config, DispatchConfig};
use crate::console::Console;
use crate::error::Error;
use crate::events::{EventBus, EventKind, EventPayload};
use crate::models::{CommandInfo, RemoteEndpoint, ShellType};
use crate::policy::AccessPolicy;
use crate::shell::arguments::{self, ProvidedArguments};
use crate::shell::context::CommandContext;
use crate::shell::help::HelpRenderer;
use crate::shell::outcome::{DispatchOutcome, HandlerFault, RejectReason};
use crate::shell::registry::{CommandMap, CommandRegistry, CommandSource, ResolvedCommand};
use crate::shell::stack::{ShellInstance, ShellStack};

const EVENT_SOURCE: &str = "dispatcher";

/// One command request
#[derive(Debug, Clone)]
pub struct ExecuteCommandParameters {
    /// Raw request text
    pub request: String,
    /// Shell type that should run the request
    pub shell_type: ShellType,
    /// Commands consulted before the registry
    pub custom_commands: Option<Arc<CommandMap>>,
    /// Remote peer the request came from
    pub remote: Option<RemoteEndpoint>,
    /// Token of the command that issued this request
    pub parent_token: Option<CancellationToken>,
}

impl ExecuteCommandParameters {
    pub fn new(request: &str, shell_type: ShellType) -> Self {
        Self {
            request: request.to_string(),
            shell_type,
            custom_commands: None,
            remote: None,
            parent_token: None,
        }
    }

    pub fn with_custom_commands(mut self, commands: Arc<CommandMap>) -> Self {
        self.custom_commands = Some(commands);
        self
    }

    pub fn with_remote(mut self, remote: RemoteEndpoint) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Cancel this request whenever `token` is cancelled
    pub fn with_parent_token(mut self, token: CancellationToken) -> Self {
        self.parent_token = Some(token);
        self
    }
}

/// Command dispatcher shared by every shell instance
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    stack: Arc<ShellStack>,
    console: Arc<Console>,
    policy: Arc<dyn AccessPolicy>,
    events: Arc<EventBus>,
    help: HelpRenderer,
    config: DispatchConfig,
    cancel_requested: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        stack: Arc<ShellStack>,
        console: Arc<Console>,
        policy: Arc<dyn AccessPolicy>,
        events: Arc<EventBus>,
        config: &Config,
    ) -> Self {
        let help = HelpRenderer::new(
            registry.clone(),
            console.clone(),
            policy.clone(),
            config.help.simplified,
        );
        Self {
            registry,
            stack,
            console,
            policy,
            events,
            help,
            config: config.dispatch.clone(),
            cancel_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Dispatch a request to the topmost shell instance of its type
    pub fn dispatch(self: &Arc<Self>, params: ExecuteCommandParameters) -> DispatchOutcome {
        let request = params.request.trim().to_string();
        if request.is_empty() {
            return DispatchOutcome::Empty;
        }
        let shell_type = params.shell_type;

        let Some(instance) = self.stack.top_of_type(shell_type) else {
            warn!("No {} shell on the stack, dropping '{}'", shell_type, request);
            return DispatchOutcome::Rejected(RejectReason::NoShellInstance);
        };

        let name = arguments::command_name(&request);
        let Some(resolved) = self.resolve(&name, shell_type, params.custom_commands.as_deref())
        else {
            debug!("Command '{}' not found in {} shell", name, shell_type);
            self.console.write_line(
                "Command {0} not found. See \"help\" for more information.",
                ColorRole::Error,
                &[&name],
            );
            return DispatchOutcome::NotFound;
        };

        if let Some(message) = self.denial(&resolved.info) {
            info!("Refused '{}' in {} shell", name, shell_type);
            self.console.write_line(message, ColorRole::Error, &[&name]);
            return DispatchOutcome::Denied;
        }

        if let CommandSource::Alias { target } = &resolved.source {
            trace!("Alias {} resolved to {}", name, target);
        }

        let token = params
            .parent_token
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_else(CancellationToken::new);
        let job = {
            let dispatcher = self.clone();
            let instance = instance.clone();
            let info = resolved.info.clone();
            let request = request.clone();
            let token = token.clone();
            let remote = params.remote.clone();
            move || dispatcher.execute(&request, &info, token, instance, remote)
        };

        let outcome = match instance.pool().run(&request, token.clone(), job) {
            Ok(outcome) => outcome,
            Err(Error::NoThreadAvailable { .. }) => {
                warn!(
                    "No command thread available in {} shell, dropping '{}'",
                    shell_type, request
                );
                DispatchOutcome::Rejected(RejectReason::NoThreadAvailable)
            }
            Err(e) => {
                error!("Could not start '{}': {}", request, e);
                DispatchOutcome::Rejected(RejectReason::ThreadSpawnFailed)
            }
        };

        // A handler may ignore its token and still return normally
        if token.is_cancelled() {
            self.clear_cancel_request();
        }

        self.report(shell_type, &request, &outcome);
        outcome
    }

    /// Dispatch a plain request line
    pub fn dispatch_line(self: &Arc<Self>, request: &str, shell_type: ShellType) -> DispatchOutcome {
        self.dispatch(ExecuteCommandParameters::new(request, shell_type))
    }

    fn resolve(
        &self,
        name: &str,
        shell_type: ShellType,
        custom: Option<&CommandMap>,
    ) -> Option<ResolvedCommand> {
        custom
            .and_then(|commands| commands.get(name))
            .map(|info| ResolvedCommand {
                info: info.clone(),
                source: CommandSource::Custom,
            })
            .or_else(|| self.registry.resolve(name, shell_type))
    }

    fn denial(&self, info: &CommandInfo) -> Option<&'static str> {
        if info.is_strict() && !self.policy.is_administrator() {
            return Some("The requested command {0} is only available to administrators.");
        }
        if info.is_no_maintenance() && self.policy.maintenance_mode() {
            return Some("The requested command {0} is not available in maintenance mode.");
        }
        None
    }

    /// Worker side of a dispatch
    fn execute(
        self: &Arc<Self>,
        request: &str,
        info: &CommandInfo,
        token: CancellationToken,
        instance: Arc<ShellInstance>,
        remote: Option<RemoteEndpoint>,
    ) -> DispatchOutcome {
        if token.is_cancelled() {
            return DispatchOutcome::Cancelled;
        }

        let args = ProvidedArguments::parse(request, Some(info));
        if info.is_obsolete() {
            warn!("Obsolete command '{}' used", info.name);
            self.console.write_line(
                "The command {0} is obsolete and will be removed in a future release.",
                ColorRole::Warning,
                &[&info.name],
            );
        }

        if !args.required_arguments_provided {
            debug!("Required arguments missing for '{}'", info.name);
            self.help.show_command_help(info);
            return DispatchOutcome::UsageShown;
        }

        let ctx = CommandContext::new(
            request,
            args,
            token.clone(),
            instance,
            self.clone(),
            remote,
        );
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            info.handler.execute_with(&ctx, ctx.remote())
        }));

        match result {
            Ok(Ok(exit_code)) => DispatchOutcome::Completed { exit_code },
            Ok(Err(e)) if is_cancellation(&e) || token.is_cancelled() => {
                debug!("Command '{}' stopped on cancellation: {:#}", info.name, e);
                DispatchOutcome::Cancelled
            }
            Ok(Err(e)) => {
                debug!("Command '{}' failed: {:?}", info.name, e);
                DispatchOutcome::Faulted(HandlerFault::from_error(&e, request))
            }
            Err(payload) => DispatchOutcome::Faulted(HandlerFault::from_panic(&*payload, request)),
        }
    }

    fn report(&self, shell_type: ShellType, request: &str, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Completed { exit_code } => {
                self.events.fire(
                    EventKind::CommandExecuted,
                    EventPayload::Command {
                        shell_type,
                        request: request.to_string(),
                        exit_code: Some(*exit_code),
                    },
                    EVENT_SOURCE,
                );
            }
            DispatchOutcome::Cancelled => {
                info!("Command '{}' cancelled", request);
                self.events.fire(
                    EventKind::CommandCancelled,
                    EventPayload::Command {
                        shell_type,
                        request: request.to_string(),
                        exit_code: None,
                    },
                    EVENT_SOURCE,
                );
            }
            DispatchOutcome::Faulted(fault) => {
                self.events.fire(
                    EventKind::CommandError,
                    EventPayload::CommandError {
                        shell_type,
                        request: request.to_string(),
                        fault: fault.clone(),
                    },
                    EVENT_SOURCE,
                );
                error!("Command '{}' in {} shell failed: {}", request, shell_type, fault);
                self.console.write_line(
                    "There was an error in the command {0}: {1}: {2}",
                    ColorRole::Error,
                    &[&arguments::command_name(request), &fault.kind, &fault.message],
                );
            }
            _ => {}
        }
    }

    /// Command registry consulted on every dispatch
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Stack of live shell instances
    pub fn stack(&self) -> &Arc<ShellStack> {
        &self.stack
    }

    /// Console that handlers and messages write to
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Shared handle to the console, for components that outlive a borrow
    pub fn console_handle(&self) -> Arc<Console> {
        self.console.clone()
    }

    /// Access policy deciding strict and maintenance refusals
    pub fn policy(&self) -> &Arc<dyn AccessPolicy> {
        &self.policy
    }

    /// Event bus receiving command outcomes
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Help renderer used for usage output
    pub fn help(&self) -> &HelpRenderer {
        &self.help
    }

    /// Worker pool settings applied to new shell instances
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Process-wide cancellation flag, shared with the cancellation controller
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel_requested.clone()
    }

    /// Whether an interrupt is waiting to be observed
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Reset the process-wide cancellation flag
    pub fn clear_cancel_request(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("depth", &self.stack.depth())
            .field("cancel_requested", &self.is_cancel_requested())
            .finish()
    }
}

fn is_cancellation(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<Error>(), Some(Error::Cancelled))
}
