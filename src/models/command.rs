//! Command Model
//!
//! A registered command: its name, visibility flags, declared argument
//! contract and the handler that runs it. Handlers are tagged once at
//! registration as local or remote-capable, so dispatch never has to probe
//! a handler for capabilities.

use bitflags::bitflags;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::console::Console;
use crate::shell::CommandContext;

bitflags! {
    /// Visibility and policy flags of a command
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u8 {
        /// Still works, but warns that it will be removed
        const OBSOLETE = 0b0000_0001;
        /// Never listed by help
        const HIDDEN = 0b0000_0010;
        /// Administrators only
        const STRICT = 0b0000_0100;
        /// Unavailable while in maintenance mode
        const NO_MAINTENANCE = 0b0000_1000;
    }
}

/// Handler of a command
pub trait CommandBase: Send + Sync {
    /// Run the command and return its exit code
    fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32>;

    /// Print additional help after the usage and description lines
    fn extra_help(&self, _console: &Console) {}
}

/// Handler that can also serve a remote debug peer
pub trait RemoteCommand: CommandBase {
    /// Run the command on behalf of a remote peer
    fn execute_remote(&self, ctx: &CommandContext, remote: &RemoteEndpoint) -> anyhow::Result<i32>;
}

/// Adapter that turns a closure into a command handler
pub struct FnCommand<F>(pub F);

impl<F> CommandBase for FnCommand<F>
where
    F: Fn(&CommandContext) -> anyhow::Result<i32> + Send + Sync,
{
    fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        (self.0)(ctx)
    }
}

/// Handler tagged with its capabilities
#[derive(Clone)]
pub enum CommandHandler {
    /// Ordinary local handler
    Local(Arc<dyn CommandBase>),
    /// Handler that can also execute for a remote debug peer
    Remote(Arc<dyn RemoteCommand>),
}

impl CommandHandler {
    /// Run locally, ignoring any remote capability
    pub fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        match self {
            CommandHandler::Local(handler) => handler.execute(ctx),
            CommandHandler::Remote(handler) => handler.execute(ctx),
        }
    }

    /// Run for the given remote endpoint when the handler supports it
    pub fn execute_with(
        &self,
        ctx: &CommandContext,
        remote: Option<&RemoteEndpoint>,
    ) -> anyhow::Result<i32> {
        match (self, remote) {
            (CommandHandler::Remote(handler), Some(endpoint)) => {
                handler.execute_remote(ctx, endpoint)
            }
            _ => self.execute(ctx),
        }
    }

    /// Invoke the handler's extra help callback
    pub fn extra_help(&self, console: &Console) {
        match self {
            CommandHandler::Local(handler) => handler.extra_help(console),
            CommandHandler::Remote(handler) => handler.extra_help(console),
        }
    }

    /// Whether the handler accepts remote peers
    pub fn is_remote_capable(&self) -> bool {
        matches!(self, CommandHandler::Remote(_))
    }
}

/// Completion callback for command arguments
pub type AutoCompleter = Arc<dyn Fn(&[String]) -> Vec<String> + Send + Sync>;

/// Declared argument contract of a command
#[derive(Clone, Default)]
pub struct CommandArgumentInfo {
    /// Whether dispatch must verify arguments before running the handler
    pub arguments_required: bool,
    /// Number of positional arguments needed when required
    pub minimum_arguments: usize,
    /// Usage lines, without the command name
    pub help_usages: Vec<String>,
    auto_completer: Option<AutoCompleter>,
}

impl CommandArgumentInfo {
    /// Optional arguments with the given usage lines
    pub fn optional(usages: &[&str]) -> Self {
        Self {
            arguments_required: false,
            minimum_arguments: 0,
            help_usages: usages.iter().map(|s| s.to_string()).collect(),
            auto_completer: None,
        }
    }

    /// At least `minimum` positional arguments (never fewer than one)
    pub fn required(minimum: usize, usages: &[&str]) -> Self {
        Self {
            arguments_required: true,
            minimum_arguments: minimum.max(1),
            help_usages: usages.iter().map(|s| s.to_string()).collect(),
            auto_completer: None,
        }
    }

    /// Attach an argument completer
    pub fn with_completer<F>(mut self, completer: F) -> Self
    where
        F: Fn(&[String]) -> Vec<String> + Send + Sync + 'static,
    {
        self.auto_completer = Some(Arc::new(completer));
        self
    }

    /// Whether `provided` positional arguments satisfy the contract
    pub fn is_satisfied_by(&self, provided: usize) -> bool {
        !self.arguments_required || provided >= self.minimum_arguments
    }

    /// Suggestions for the given argument list
    pub fn complete(&self, arguments: &[String]) -> Vec<String> {
        self.auto_completer
            .as_ref()
            .map(|completer| completer(arguments))
            .unwrap_or_default()
    }
}

impl fmt::Debug for CommandArgumentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandArgumentInfo")
            .field("arguments_required", &self.arguments_required)
            .field("minimum_arguments", &self.minimum_arguments)
            .field("help_usages", &self.help_usages)
            .field("auto_completer", &self.auto_completer.is_some())
            .finish()
    }
}

/// A registered command
#[derive(Clone)]
pub struct CommandInfo {
    /// Command name as typed by the user
    pub name: String,
    /// One-line description shown by help
    pub description: String,
    /// Visibility and policy flags
    pub flags: CommandFlags,
    /// Declared argument contract, if any
    pub argument_info: Option<CommandArgumentInfo>,
    /// Handler that runs the command
    pub handler: CommandHandler,
}

impl CommandInfo {
    /// Create a command with a local handler
    pub fn new<H>(name: &str, description: &str, handler: H) -> Self
    where
        H: CommandBase + 'static,
    {
        Self::with_handler(name, description, CommandHandler::Local(Arc::new(handler)))
    }

    /// Create a command whose handler also serves remote debug peers
    pub fn remote<H>(name: &str, description: &str, handler: H) -> Self
    where
        H: RemoteCommand + 'static,
    {
        Self::with_handler(name, description, CommandHandler::Remote(Arc::new(handler)))
    }

    /// Create a command from a closure
    pub fn from_fn<F>(name: &str, description: &str, f: F) -> Self
    where
        F: Fn(&CommandContext) -> anyhow::Result<i32> + Send + Sync + 'static,
    {
        Self::new(name, description, FnCommand(f))
    }

    fn with_handler(name: &str, description: &str, handler: CommandHandler) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            flags: CommandFlags::empty(),
            argument_info: None,
            handler,
        }
    }

    /// Set the command flags
    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach an argument contract
    pub fn with_arguments(mut self, info: CommandArgumentInfo) -> Self {
        self.argument_info = Some(info);
        self
    }

    pub fn is_obsolete(&self) -> bool {
        self.flags.contains(CommandFlags::OBSOLETE)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(CommandFlags::HIDDEN)
    }

    pub fn is_strict(&self) -> bool {
        self.flags.contains(CommandFlags::STRICT)
    }

    pub fn is_no_maintenance(&self) -> bool {
        self.flags.contains(CommandFlags::NO_MAINTENANCE)
    }

    /// Whether the command declares mandatory arguments
    pub fn arguments_required(&self) -> bool {
        self.argument_info
            .as_ref()
            .is_some_and(|info| info.arguments_required)
    }

    /// Declared usage lines
    pub fn help_usages(&self) -> &[String] {
        self.argument_info
            .as_ref()
            .map(|info| info.help_usages.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Debug for CommandInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInfo")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("flags", &self.flags)
            .field("argument_info", &self.argument_info)
            .field("remote_capable", &self.handler.is_remote_capable())
            .finish()
    }
}

/// Connected remote debug peer
#[derive(Clone)]
pub struct RemoteEndpoint {
    address: String,
    stream: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl RemoteEndpoint {
    /// Wrap a peer's output stream
    pub fn new<W>(address: &str, stream: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            address: address.to_string(),
            stream: Arc::new(Mutex::new(Box::new(stream))),
        }
    }

    /// Peer address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send one line to the peer
    pub fn send_line(&self, text: &str) -> std::io::Result<()> {
        let mut stream = self.stream.lock();
        stream.write_all(text.as_bytes())?;
        stream.write_all(b"\r\n")?;
        stream.flush()
    }
}

impl fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("address", &self.address)
            .finish()
    }
}
