//! Command registry
//!
//! Holds, per shell type, the built-in, mod-provided and alias tables,
//! plus one unified table whose commands exist in every shell. Tables are
//! written at load time (shell registration, mod and addon loading) and
//! read by every dispatch, so they sit behind reader/writer locks.

use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{CommandInfo, ShellType};

/// Name to command table
pub type CommandMap = HashMap<String, Arc<CommandInfo>>;

/// Where a resolved command came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    /// Shell's built-in table
    BuiltIn,
    /// Mod-provided table
    Mod,
    /// Unified table, available in every shell
    Unified,
    /// Alias resolved to this target name
    Alias { target: String },
    /// Custom table passed with the request
    Custom,
}

/// A command found by name
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub info: Arc<CommandInfo>,
    pub source: CommandSource,
}

/// Per shell type runtime state
#[derive(Debug)]
pub struct ShellInfo {
    shell_type: ShellType,
    lock: Mutex<()>,
    commands: RwLock<CommandMap>,
    mod_commands: RwLock<CommandMap>,
    aliases: RwLock<HashMap<String, String>>,
}

impl ShellInfo {
    fn new(shell_type: ShellType) -> Self {
        Self {
            shell_type,
            lock: Mutex::new(()),
            commands: RwLock::new(HashMap::new()),
            mod_commands: RwLock::new(HashMap::new()),
            aliases: RwLock::new(HashMap::new()),
        }
    }

    /// Shell type this info belongs to
    pub fn shell_type(&self) -> ShellType {
        self.shell_type
    }

    /// Take the lock that serializes cancellation for this shell type
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Whether a cancellation currently holds the lock
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Snapshot of the built-in table
    pub fn commands(&self) -> CommandMap {
        self.commands.read().clone()
    }

    /// Snapshot of the mod-provided table
    pub fn mod_commands(&self) -> CommandMap {
        self.mod_commands.read().clone()
    }

    /// Snapshot of the alias table (alias to target name)
    pub fn aliases(&self) -> HashMap<String, String> {
        self.aliases.read().clone()
    }
}

/// Registry of every shell's commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    shells: RwLock<HashMap<ShellType, Arc<ShellInfo>>>,
    unified: RwLock<CommandMap>,
}

impl CommandRegistry {
    /// Create an empty registry with no shells registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every known shell type registered
    pub fn with_all_shells() -> Self {
        let registry = Self::new();
        for shell_type in ShellType::ALL {
            registry.register_shell(shell_type);
        }
        registry
    }

    /// Register a shell type, returning its info (idempotent)
    pub fn register_shell(&self, shell_type: ShellType) -> Arc<ShellInfo> {
        self.shells
            .write()
            .entry(shell_type)
            .or_insert_with(|| {
                debug!("Registered shell type {}", shell_type);
                Arc::new(ShellInfo::new(shell_type))
            })
            .clone()
    }

    /// Runtime state of a registered shell type
    pub fn shell_info(&self, shell_type: ShellType) -> Result<Arc<ShellInfo>> {
        self.shells
            .read()
            .get(&shell_type)
            .cloned()
            .ok_or_else(|| Error::ShellNotRegistered {
                shell_type: shell_type.to_string(),
            })
    }

    /// Every registered shell type
    pub fn registered_shells(&self) -> Vec<ShellType> {
        self.shells.read().keys().copied().collect()
    }

    /// Add a built-in command to a shell
    pub fn add_command(&self, shell_type: ShellType, info: CommandInfo) -> Result<()> {
        let shell = self.shell_info(shell_type)?;
        let mut commands = shell.commands.write();
        if commands.contains_key(&info.name) {
            return Err(duplicate(&info.name, shell_type));
        }
        debug!("Added command {} to shell {}", info.name, shell_type);
        commands.insert(info.name.clone(), Arc::new(info));
        Ok(())
    }

    /// Add a command that every shell type can run
    pub fn add_unified_command(&self, info: CommandInfo) -> Result<()> {
        let mut unified = self.unified.write();
        if unified.contains_key(&info.name) {
            return Err(Error::DuplicateCommand {
                command: info.name.clone(),
                shell_type: "unified".to_string(),
            });
        }
        debug!("Added unified command {}", info.name);
        unified.insert(info.name.clone(), Arc::new(info));
        Ok(())
    }

    /// Add a mod-provided command; mods cannot shadow built-ins
    pub fn add_mod_command(&self, shell_type: ShellType, info: CommandInfo) -> Result<()> {
        let shell = self.shell_info(shell_type)?;
        if shell.commands.read().contains_key(&info.name) {
            return Err(duplicate(&info.name, shell_type));
        }

        let mut mods = shell.mod_commands.write();
        if mods.contains_key(&info.name) {
            return Err(duplicate(&info.name, shell_type));
        }
        debug!("Added mod command {} to shell {}", info.name, shell_type);
        mods.insert(info.name.clone(), Arc::new(info));
        Ok(())
    }

    /// Remove a mod-provided command, returning whether it existed
    pub fn remove_mod_command(&self, shell_type: ShellType, name: &str) -> bool {
        self.shell_info(shell_type)
            .map(|shell| shell.mod_commands.write().remove(name).is_some())
            .unwrap_or(false)
    }

    /// Add an alias for an existing command
    ///
    /// An alias name already in use is rejected; remove it first to retarget.
    pub fn add_alias(&self, shell_type: ShellType, alias: &str, target: &str) -> Result<()> {
        let shell = self.shell_info(shell_type)?;
        if self.find_command(&shell, alias).is_some() {
            return Err(duplicate(alias, shell_type));
        }
        if self.find_command(&shell, target).is_none() {
            return Err(Error::AliasTargetNotFound {
                alias: alias.to_string(),
                target: target.to_string(),
                shell_type: shell_type.to_string(),
            });
        }

        let mut aliases = shell.aliases.write();
        if aliases.contains_key(alias) {
            return Err(duplicate(alias, shell_type));
        }
        aliases.insert(alias.to_string(), target.to_string());
        Ok(())
    }

    /// Remove an alias, returning whether it existed
    pub fn remove_alias(&self, shell_type: ShellType, alias: &str) -> bool {
        self.shell_info(shell_type)
            .map(|shell| shell.aliases.write().remove(alias).is_some())
            .unwrap_or(false)
    }

    /// Built-in commands of a shell overlaid with the unified commands
    ///
    /// Unified entries win over built-ins of the same name.
    pub fn get_commands(&self, shell_type: ShellType) -> CommandMap {
        let mut merged = self
            .shell_info(shell_type)
            .map(|shell| shell.commands())
            .unwrap_or_default();
        merged.extend(self.unified_commands());
        merged
    }

    /// Snapshot of the unified table
    pub fn unified_commands(&self) -> CommandMap {
        self.unified.read().clone()
    }

    /// Whether a command is a unified command
    pub fn is_unified(&self, name: &str) -> bool {
        self.unified.read().contains_key(name)
    }

    /// Whether `name` is runnable in the given shell
    pub fn is_command_found(&self, name: &str, shell_type: ShellType) -> bool {
        if self.is_unified(name) {
            return true;
        }
        match self.shell_info(shell_type) {
            Ok(shell) => {
                self.find_command(&shell, name).is_some() || shell.aliases.read().contains_key(name)
            }
            Err(_) => false,
        }
    }

    /// Whether `name` is runnable in any registered shell
    pub fn is_command_found_anywhere(&self, name: &str) -> bool {
        self.registered_shells()
            .into_iter()
            .any(|shell_type| self.is_command_found(name, shell_type))
    }

    /// Look a command up the way dispatch does
    ///
    /// Order: unified, built-in, mod, then alias target.
    pub fn resolve(&self, name: &str, shell_type: ShellType) -> Option<ResolvedCommand> {
        let shell = match self.shell_info(shell_type) {
            Ok(shell) => shell,
            Err(_) => {
                return self.unified.read().get(name).map(|info| ResolvedCommand {
                    info: info.clone(),
                    source: CommandSource::Unified,
                })
            }
        };

        if let Some(found) = self.find_command(&shell, name) {
            return Some(found);
        }

        let target = shell.aliases.read().get(name).cloned()?;
        self.find_command(&shell, &target).map(|found| ResolvedCommand {
            info: found.info,
            source: CommandSource::Alias { target },
        })
    }

    fn find_command(&self, shell: &ShellInfo, name: &str) -> Option<ResolvedCommand> {
        let lookups = [
            (&self.unified, CommandSource::Unified),
            (&shell.commands, CommandSource::BuiltIn),
            (&shell.mod_commands, CommandSource::Mod),
        ];
        lookups.into_iter().find_map(|(table, source)| {
            table.read().get(name).map(|info| ResolvedCommand {
                info: info.clone(),
                source,
            })
        })
    }
}

fn duplicate(name: &str, shell_type: ShellType) -> Error {
    Error::DuplicateCommand {
        command: name.to_string(),
        shell_type: shell_type.to_string(),
    }
}
