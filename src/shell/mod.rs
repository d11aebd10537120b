//! Shell stack and command dispatch engine
//!
//! Requests flow through this module as follows: the [`Dispatcher`] parses
//! the request with [`ProvidedArguments`], looks it up in the
//! [`CommandRegistry`], and runs it on a worker of the target
//! [`ShellInstance`]'s [`ExecutionPool`]. The [`CancellationController`] can
//! interrupt the current shell at any point, and the [`HelpRenderer`] prints
//! listings and usage.

pub mod arguments;
pub mod cancellation;
pub mod context;
pub mod dispatcher;
pub mod help;
pub mod outcome;
pub mod pool;
pub mod registry;
pub mod session;
pub mod stack;
pub mod switches;

pub use arguments::ProvidedArguments;
pub use cancellation::{CancelReport, CancellationController};
pub use context::CommandContext;
pub use dispatcher::{Dispatcher, ExecuteCommandParameters};
pub use help::{HelpListing, HelpOutcome, HelpRenderer};
pub use outcome::{DispatchOutcome, HandlerFault, RejectReason};
pub use pool::{ExecutionPool, WorkerSlot};
pub use registry::{CommandMap, CommandRegistry, CommandSource, ResolvedCommand, ShellInfo};
pub use session::ShellSession;
pub use stack::{ShellInstance, ShellStack};
pub use switches::{contains_switch, get_switch_value, parse_switch_values};
