//! Help rendering
//!
//! Lists the commands a user may run in a shell and prints usage for a
//! single command. Hidden commands are never listed; strict commands are
//! listed for administrators only; commands unavailable in maintenance mode
//! are left out while it is active.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ansi::ColorRole;
use crate::console::Console;
use crate::models::{CommandInfo, ShellType};
use crate::policy::AccessPolicy;
use crate::shell::registry::{CommandMap, CommandRegistry};

/// What [`HelpRenderer::show_help`] printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpOutcome {
    /// Command listing with this many entries
    Listing(usize),
    /// Usage of one command
    Command,
    /// The requested command does not exist
    NoHelp,
}

/// Visible commands of one shell, bucketed and sorted by name
#[derive(Debug, Default)]
pub struct HelpListing {
    pub builtin: Vec<Arc<CommandInfo>>,
    pub mods: Vec<Arc<CommandInfo>>,
    /// Alias name and the command it stands for
    pub aliases: Vec<(String, Arc<CommandInfo>)>,
    pub unified: Vec<Arc<CommandInfo>>,
}

impl HelpListing {
    pub fn len(&self) -> usize {
        self.builtin.len() + self.mods.len() + self.aliases.len() + self.unified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every listed name, in display order
    pub fn names(&self) -> Vec<String> {
        self.builtin
            .iter()
            .chain(&self.mods)
            .map(|info| info.name.clone())
            .chain(self.aliases.iter().map(|(alias, _)| alias.clone()))
            .chain(self.unified.iter().map(|info| info.name.clone()))
            .collect()
    }
}

/// Renders command listings and usage through the console
pub struct HelpRenderer {
    registry: Arc<CommandRegistry>,
    console: Arc<Console>,
    policy: Arc<dyn AccessPolicy>,
    simplified: AtomicBool,
}

impl HelpRenderer {
    pub fn new(
        registry: Arc<CommandRegistry>,
        console: Arc<Console>,
        policy: Arc<dyn AccessPolicy>,
        simplified: bool,
    ) -> Self {
        Self {
            registry,
            console,
            policy,
            simplified: AtomicBool::new(simplified),
        }
    }

    pub fn set_simplified(&self, simplified: bool) {
        self.simplified.store(simplified, Ordering::SeqCst);
    }

    pub fn is_simplified(&self) -> bool {
        self.simplified.load(Ordering::SeqCst)
    }

    /// Whether help may list the command for the current user
    pub fn is_visible(&self, info: &CommandInfo) -> bool {
        if info.is_hidden() {
            return false;
        }
        if info.is_strict() && !self.policy.is_administrator() {
            return false;
        }
        !(info.is_no_maintenance() && self.policy.maintenance_mode())
    }

    /// Visible commands of a shell
    pub fn listing(&self, shell_type: ShellType) -> HelpListing {
        let unified = self.registry.unified_commands();
        let (builtin, mods, aliases) = match self.registry.shell_info(shell_type) {
            Ok(shell) => (shell.commands(), shell.mod_commands(), shell.aliases()),
            Err(_) => Default::default(),
        };

        // Built-ins shadowed by a unified command are listed once, as unified
        let builtin: CommandMap = builtin
            .into_iter()
            .filter(|(name, _)| !unified.contains_key(name))
            .collect();

        let mut aliases: Vec<(String, Arc<CommandInfo>)> = aliases
            .into_iter()
            .filter_map(|(alias, _)| {
                let target = self.registry.resolve(&alias, shell_type)?.info;
                self.is_visible(&target).then_some((alias, target))
            })
            .collect();
        aliases.sort_by(|a, b| a.0.cmp(&b.0));

        HelpListing {
            builtin: self.visible_sorted(builtin),
            mods: self.visible_sorted(mods),
            aliases,
            unified: self.visible_sorted(unified),
        }
    }

    fn visible_sorted(&self, commands: CommandMap) -> Vec<Arc<CommandInfo>> {
        let mut visible: Vec<Arc<CommandInfo>> = commands
            .into_values()
            .filter(|info| self.is_visible(info))
            .collect();
        visible.sort_by(|a, b| a.name.cmp(&b.name));
        visible
    }

    /// Print the command listing, or the usage of `command`
    pub fn show_help(&self, command: Option<&str>, shell_type: ShellType) -> HelpOutcome {
        let Some(name) = command.map(str::trim).filter(|name| !name.is_empty()) else {
            let listing = self.listing(shell_type);
            if self.is_simplified() {
                self.write_simplified(&listing);
            } else {
                self.write_listing(&listing);
            }
            return HelpOutcome::Listing(listing.len());
        };

        match self.registry.resolve(name, shell_type) {
            Some(resolved) => {
                self.show_command_help(&resolved.info);
                HelpOutcome::Command
            }
            None => {
                self.console
                    .write_line("No help for command \"{0}\".", ColorRole::Error, &[&name]);
                HelpOutcome::NoHelp
            }
        }
    }

    /// Print usage lines, description and extra help of one command
    pub fn show_command_help(&self, info: &CommandInfo) {
        let prefix = self.console.translate("Usage:");
        let usages = info.help_usages();

        if usages.is_empty() {
            self.console.write_raw(
                &format!("{} {}", prefix, info.name),
                true,
                ColorRole::ListTitle,
            );
        } else {
            let indent = " ".repeat(prefix.chars().count());
            for (index, usage) in usages.iter().enumerate() {
                let lead = if index == 0 { prefix.as_str() } else { indent.as_str() };
                self.console.write_raw(
                    &format!("{} {} {}", lead, info.name, usage),
                    true,
                    ColorRole::ListTitle,
                );
            }
        }

        self.console.write_raw("", true, ColorRole::Neutral);
        self.console
            .write_line(&info.description, ColorRole::Neutral, &[]);
        info.handler.extra_help(&self.console);
    }

    fn write_listing(&self, listing: &HelpListing) {
        self.write_bucket("General commands:", &listing.builtin, "-");
        self.write_bucket("Mod commands:", &listing.mods, "-");

        if !listing.aliases.is_empty() {
            self.console
                .write_line("Aliases:", ColorRole::ListTitle, &[]);
            for (alias, target) in &listing.aliases {
                self.console.write_raw(
                    &format!("  - {} -> {}", alias, target.name),
                    true,
                    ColorRole::ListEntry,
                );
            }
        }

        self.write_bucket("Unified commands:", &listing.unified, "*");
    }

    fn write_bucket(&self, title: &str, commands: &[Arc<CommandInfo>], marker: &str) {
        if commands.is_empty() {
            return;
        }
        self.console.write_line(title, ColorRole::ListTitle, &[]);
        for info in commands {
            self.console.write_raw(
                &format!("  {} {}: ", marker, info.name),
                false,
                ColorRole::ListEntry,
            );
            self.console
                .write_line(&info.description, ColorRole::ListValue, &[]);
        }
    }

    fn write_simplified(&self, listing: &HelpListing) {
        let names: Vec<String> = listing
            .builtin
            .iter()
            .chain(&listing.mods)
            .map(|info| info.name.clone())
            .chain(listing.aliases.iter().map(|(alias, _)| alias.clone()))
            .chain(listing.unified.iter().map(|info| format!("*{}", info.name)))
            .collect();
        self.console
            .write_raw(&names.join(", "), true, ColorRole::ListEntry);
    }
}

impl std::fmt::Debug for HelpRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpRenderer")
            .field("simplified", &self.is_simplified())
            .finish()
    }
}
