//! Argument parsing
//!
//! Splits a requested command line into the command name, positional
//! arguments and switches. Splitting is quote-aware: `copy "a b" c` has two
//! arguments. Only double quotes group words, so apostrophes in free text
//! (`don't`) stay part of their word. An unbalanced quote never fails; the
//! remainder of the line becomes one word.

use crate::models::CommandInfo;
use crate::shell::switches;

/// Arguments supplied with one command request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvidedArguments {
    /// Requested command name
    pub command: String,
    /// Positional argument words as typed, joined by single spaces
    pub arguments_text: String,
    /// Positional arguments with quotes removed
    pub arguments: Vec<String>,
    /// Switch tokens, such as `-force` or `-depth=3`
    pub switches: Vec<String>,
    /// Whether the command's required arguments were supplied
    pub required_arguments_provided: bool,
}

impl ProvidedArguments {
    /// Parse a request against the resolved command, if any
    pub fn parse(request: &str, info: Option<&CommandInfo>) -> Self {
        let words = split_words(request);
        let Some((first, rest)) = words.split_first() else {
            return Self {
                required_arguments_provided: true,
                ..Self::default()
            };
        };

        let mut positional = Vec::new();
        let mut arguments = Vec::new();
        let mut switch_tokens = Vec::new();
        for word in rest {
            if is_switch(word) {
                switch_tokens.push(word.to_string());
            } else {
                positional.push(*word);
                arguments.push(unquote(word));
            }
        }

        let required_arguments_provided = info
            .and_then(|info| info.argument_info.as_ref())
            .map_or(true, |contract| contract.is_satisfied_by(arguments.len()));

        Self {
            command: unquote(first),
            arguments_text: positional.join(" "),
            arguments,
            switches: switch_tokens,
            required_arguments_provided,
        }
    }

    /// Value of a `-key=value` switch, or an empty string
    pub fn switch_value(&self, key: &str) -> String {
        switches::get_switch_value(&self.switches, key)
    }

    /// Whether a switch was passed
    pub fn has_switch(&self, key: &str) -> bool {
        switches::contains_switch(&self.switches, key)
    }
}

/// Command name of a request, without parsing the rest
pub fn command_name(request: &str) -> String {
    split_words(request)
        .first()
        .map(|word| unquote(word))
        .unwrap_or_default()
}

/// Split on whitespace outside of double quotes, keeping the quotes in the words
pub fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut quoted = false;

    for (index, ch) in text.char_indices() {
        if ch == '"' {
            quoted = !quoted;
            start.get_or_insert(index);
        } else if ch.is_whitespace() && !quoted {
            if let Some(begin) = start.take() {
                words.push(&text[begin..index]);
            }
        } else {
            start.get_or_insert(index);
        }
    }

    if let Some(begin) = start {
        words.push(&text[begin..]);
    }
    words
}

/// Remove the double quotes from a single word
fn unquote(word: &str) -> String {
    word.replace('"', "")
}

/// Switches start with a dash followed by something other than a digit
fn is_switch(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next() == Some('-')
        && chars
            .next()
            .is_some_and(|second| !second.is_ascii_digit() && !second.is_whitespace())
}
