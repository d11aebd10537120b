//! Command and Argument Completion
//!
//! Completes command names visible in a shell and delegates argument
//! completion to the command's own autocompleter.

use std::sync::Arc;

use crate::models::{CommandInfo, ShellType};
use crate::shell::arguments::{self, ProvidedArguments};
use crate::shell::{CommandRegistry, HelpRenderer};

/// Completion provider for one registry
pub struct CompletionProvider {
    registry: Arc<CommandRegistry>,
}

/// Completion result containing suggestions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    /// List of completion suggestions
    pub suggestions: Vec<CompletionItem>,
    /// The prefix that was matched
    pub prefix: String,
    /// Type of completion
    pub completion_type: CompletionType,
}

/// Individual completion item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// The completion text
    pub text: String,
    /// Type of completion item
    pub item_type: CompletionItemType,
    /// Description or additional info
    pub description: Option<String>,
}

/// Type of completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionType {
    /// Command name completion
    Command,
    /// Argument completion
    Argument,
}

/// Type of completion item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemType {
    /// Command of the shell itself
    Command,
    /// Unified command
    Unified,
    /// Alias of another command
    Alias,
    /// Value offered by a command's autocompleter
    Argument,
}

impl CompletionProvider {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Get completions for the given input
    ///
    /// Only commands `help` would list are offered as names, so hidden and
    /// restricted commands stay out of sight.
    pub fn get_completions(
        &self,
        input: &str,
        shell_type: ShellType,
        help: &HelpRenderer,
    ) -> CompletionResult {
        let trimmed = input.trim_start();
        let words = arguments::split_words(trimmed);

        let completing_name = words.len() <= 1 && !trimmed.ends_with(char::is_whitespace);
        if completing_name {
            let prefix = words.first().copied().unwrap_or_default();
            return self.complete_command(prefix, shell_type, help);
        }

        self.complete_arguments(trimmed, shell_type)
    }

    /// Complete a command name
    fn complete_command(
        &self,
        prefix: &str,
        shell_type: ShellType,
        help: &HelpRenderer,
    ) -> CompletionResult {
        let listing = help.listing(shell_type);

        let mut suggestions: Vec<CompletionItem> = listing
            .builtin
            .iter()
            .chain(&listing.mods)
            .map(|info| command_item(info, CompletionItemType::Command))
            .chain(listing.aliases.iter().map(|(alias, target)| CompletionItem {
                text: alias.clone(),
                item_type: CompletionItemType::Alias,
                description: Some(target.name.clone()),
            }))
            .chain(
                listing
                    .unified
                    .iter()
                    .map(|info| command_item(info, CompletionItemType::Unified)),
            )
            .filter(|item| item.text.starts_with(prefix))
            .collect();
        suggestions.sort_by(|a, b| a.text.cmp(&b.text));

        CompletionResult {
            suggestions,
            prefix: prefix.to_string(),
            completion_type: CompletionType::Command,
        }
    }

    /// Ask the command's autocompleter for argument values
    fn complete_arguments(&self, input: &str, shell_type: ShellType) -> CompletionResult {
        let parsed = ProvidedArguments::parse(input, None);
        let prefix = if input.ends_with(char::is_whitespace) {
            String::new()
        } else {
            parsed.arguments.last().cloned().unwrap_or_default()
        };

        let suggestions = self
            .registry
            .resolve(&parsed.command, shell_type)
            .and_then(|resolved| resolved.info.argument_info.clone())
            .map(|argument_info| argument_info.complete(&parsed.arguments))
            .unwrap_or_default()
            .into_iter()
            .filter(|text| text.starts_with(&prefix))
            .map(|text| CompletionItem {
                text,
                item_type: CompletionItemType::Argument,
                description: None,
            })
            .collect();

        CompletionResult {
            suggestions,
            prefix,
            completion_type: CompletionType::Argument,
        }
    }
}

fn command_item(info: &CommandInfo, item_type: CompletionItemType) -> CompletionItem {
    CompletionItem {
        text: info.name.clone(),
        item_type,
        description: Some(info.description.clone()),
    }
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider").finish_non_exhaustive()
    }
}

impl CompletionResult {
    /// Check if there are any suggestions
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Get the number of suggestions
    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    /// Get the common prefix of all suggestions (for automatic completion)
    pub fn get_common_prefix(&self) -> Option<String> {
        let first = &self.suggestions.first()?.text;
        if self.suggestions.len() == 1 {
            return Some(first.clone());
        }

        let mut common = String::new();
        for (i, ch) in first.chars().enumerate() {
            if self
                .suggestions
                .iter()
                .all(|s| s.text.chars().nth(i) == Some(ch))
            {
                common.push(ch);
            } else {
                break;
            }
        }

        if common.len() > self.prefix.len() {
            Some(common)
        } else {
            None
        }
    }
}
