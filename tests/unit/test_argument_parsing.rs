//! Unit Tests for Argument Parsing

use shellstack::shell::arguments::{command_name, split_words};
use shellstack::shell::ProvidedArguments;
use shellstack::{CommandArgumentInfo, CommandInfo};

fn command_with_arity(minimum: usize) -> CommandInfo {
    CommandInfo::from_fn("cmd", "Test command", |_| Ok(0))
        .with_arguments(CommandArgumentInfo::required(minimum, &["<a> <b>"]))
}

#[test]
fn test_empty_request() {
    let parsed = ProvidedArguments::parse("", None);
    assert!(parsed.command.is_empty());
    assert!(parsed.arguments.is_empty());
    assert!(parsed.switches.is_empty());
    assert!(parsed.required_arguments_provided);
}

#[test]
fn test_plain_words() {
    let parsed = ProvidedArguments::parse("echo hello world", None);
    assert_eq!(parsed.command, "echo");
    assert_eq!(parsed.arguments, vec!["hello", "world"]);
    assert_eq!(parsed.arguments_text, "hello world");
}

#[test]
fn test_extra_whitespace_is_collapsed() {
    let parsed = ProvidedArguments::parse("  echo   a    b  ", None);
    assert_eq!(parsed.arguments, vec!["a", "b"]);
    assert_eq!(parsed.arguments_text, "a b");
}

#[test]
fn test_quoted_arguments() {
    let parsed = ProvidedArguments::parse(r#"put "local file.txt" "remote dir""#, None);
    assert_eq!(parsed.arguments, vec!["local file.txt", "remote dir"]);
    assert_eq!(parsed.arguments_text, r#""local file.txt" "remote dir""#);
}

#[test]
fn test_quoted_command_name() {
    assert_eq!(command_name(r#""my cmd" arg"#), "my cmd");
}

#[test]
fn test_apostrophes_stay_in_words() {
    let parsed = ProvidedArguments::parse("echo don't stop now", None);
    assert_eq!(parsed.command, "echo");
    assert_eq!(parsed.arguments, vec!["don't", "stop", "now"]);
    assert_eq!(parsed.arguments_text, "don't stop now");
}

#[test]
fn test_single_quotes_do_not_group() {
    let parsed = ProvidedArguments::parse("put 'remote dir'", None);
    assert_eq!(parsed.arguments, vec!["'remote", "dir'"]);
}

#[test]
fn test_apostrophe_inside_double_quotes() {
    let parsed = ProvidedArguments::parse(r#"say "it's fine" now"#, None);
    assert_eq!(parsed.arguments, vec!["it's fine", "now"]);
}

#[test]
fn test_unbalanced_quote_takes_rest_of_line() {
    let parsed = ProvidedArguments::parse(r#"say "hello there"#, None);
    assert_eq!(parsed.command, "say");
    assert_eq!(parsed.arguments, vec!["hello there"]);
}

#[test]
fn test_arity_gate_counts_words_with_apostrophes() {
    let info = command_with_arity(2);
    assert!(ProvidedArguments::parse("cmd don't panic", Some(&info)).required_arguments_provided);
    assert!(!ProvidedArguments::parse("cmd won't", Some(&info)).required_arguments_provided);
}

#[test]
fn test_arity_gate_against_contract() {
    let info = command_with_arity(2);
    assert!(!ProvidedArguments::parse("cmd", Some(&info)).required_arguments_provided);
    assert!(!ProvidedArguments::parse("cmd a", Some(&info)).required_arguments_provided);
    assert!(ProvidedArguments::parse("cmd a b", Some(&info)).required_arguments_provided);
    assert!(ProvidedArguments::parse("cmd a b c", Some(&info)).required_arguments_provided);
}

#[test]
fn test_optional_contract_always_satisfied() {
    let info = CommandInfo::from_fn("ls", "List", |_| Ok(0))
        .with_arguments(CommandArgumentInfo::optional(&["[dir]"]));
    assert!(ProvidedArguments::parse("ls", Some(&info)).required_arguments_provided);
}

#[test]
fn test_split_words_with_tabs() {
    assert_eq!(split_words("a\tb  c"), vec!["a", "b", "c"]);
    assert!(split_words("   ").is_empty());
}
