//! shellstack - a nested multi-shell console framework
//!
//! A stack of interactive shells (the main shell, an FTP shell, a text
//! editor shell, a debug shell, ...), each with its own table of named
//! commands. Input lines are parsed into a command name, arguments and
//! switches, then dispatched to a handler running on an interruptible
//! worker thread that belongs to the shell instance.
//!
//! ## Module Organization
//!
//! ### Dispatch engine
//!
//! - [`shell`] - Argument and switch parsing, command registry, worker
//!   pools, dispatcher, cancellation, help rendering and shell sessions
//! - [`models`] - Shell types and command definitions
//!
//! ### Collaborators
//!
//! - [`console`] - Color-tagged console output over swappable drivers
//! - [`translation`] - Message catalogs
//! - [`policy`] - Administrator and maintenance mode queries
//! - [`events`] - Broadcast bus for command and shell events
//! - [`completion`] - Command name and argument completion
//!
//! ### Utilities
//!
//! - [`config`] - Configuration loading and validation
//! - [`ansi`] - ANSI color utilities
//! - [`mod@error`] - Error types and Result aliases
//! - [`runtime`] - Assembles all of the above from a [`Config`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use shellstack::{init, CommandArgumentInfo, CommandInfo, ShellType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = init()?;
//! runtime.registry().add_command(
//!     ShellType::Shell,
//!     CommandInfo::from_fn("echo", "Print the arguments", |ctx| {
//!         ctx.console().write_raw(ctx.arguments_text(), true, Default::default());
//!         Ok(0)
//!     })
//!     .with_arguments(CommandArgumentInfo::required(1, &["<text>"])),
//! )?;
//! runtime.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! - **Caller thread:** reads input and blocks while a command runs
//! - **Command workers:** one primary and a stack of alternates per shell
//!   instance; nested commands run on alternates
//! - **Interrupt listener:** the binary waits for Ctrl-C on a small tokio
//!   runtime and forwards it to the [`CancellationController`]

#[macro_use]
extern crate tracing;

pub mod ansi;
pub mod completion;
pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod models;
pub mod policy;
pub mod runtime;
pub mod shell;
pub mod translation;

// Re-exports for core functionality
pub use config::loader::ConfigLoader;
pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    CommandArgumentInfo, CommandBase, CommandFlags, CommandHandler, CommandInfo, RemoteCommand,
    RemoteEndpoint, ShellType,
};
pub use runtime::ShellRuntime;
pub use shell::{
    CancellationController, CommandContext, CommandRegistry, DispatchOutcome, Dispatcher,
    ExecuteCommandParameters, HelpRenderer,
};

// Version information
/// The current version of shellstack from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The crate description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize a terminal-bound runtime from the default configuration
///
/// Configuration is looked up on the usual search paths; when loading
/// fails the defaults are used and a warning is logged.
///
/// # Errors
///
/// Returns an error if the configured translation catalog cannot be loaded
/// or the first command worker cannot be spawned.
pub fn init() -> Result<ShellRuntime> {
    info!("Initializing {} v{}", NAME, VERSION);

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Config::default()
        }
    };

    ShellRuntime::new(config)
}

/// Initialize a terminal-bound runtime from a specific configuration file
pub fn init_with_config(config_path: &std::path::Path) -> Result<ShellRuntime> {
    info!(
        "Initializing {} v{} with config: {}",
        NAME,
        VERSION,
        config_path.display()
    );
    let config = ConfigLoader::load_from_path(config_path)?;
    ShellRuntime::new(config)
}
