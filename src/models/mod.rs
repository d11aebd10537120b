//! Core data models for shellstack
//!
//! Shell flavors and the command entities that shells register.

pub mod command;
pub mod shell_type;

// Re-exports for convenience
pub use command::{
    AutoCompleter, CommandArgumentInfo, CommandBase, CommandFlags, CommandHandler, CommandInfo,
    FnCommand, RemoteCommand, RemoteEndpoint,
};
pub use shell_type::ShellType;
