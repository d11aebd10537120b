//! Property-based tests for request parsing

use proptest::prelude::*;
use shellstack::shell::arguments::split_words;
use shellstack::shell::{contains_switch, get_switch_value, ProvidedArguments};
use shellstack::{CommandArgumentInfo, CommandInfo};

proptest! {
    #[test]
    fn test_parse_doesnt_panic(s in "\\PC*") {
        let _ = ProvidedArguments::parse(&s, None);
        // Unbalanced quotes and odd whitespace never fail
    }

    #[test]
    fn test_plain_words_round_trip(
        cmd in "[a-z]{1,10}",
        args in prop::collection::vec("[a-z0-9]{1,10}", 0..6),
    ) {
        let request = format!("{} {}", cmd, args.join(" "));
        let parsed = ProvidedArguments::parse(&request, None);
        prop_assert_eq!(&parsed.command, &cmd);
        prop_assert_eq!(&parsed.arguments, &args);
        prop_assert!(parsed.switches.is_empty());
    }

    #[test]
    fn test_quoted_argument_keeps_spaces(
        first in "[a-z]{1,6}",
        second in "[a-z]{1,6}",
        tail in "[a-z]{1,6}",
    ) {
        let request = format!("put \"{} {}\" {}", first, second, tail);
        let parsed = ProvidedArguments::parse(&request, None);
        prop_assert_eq!(parsed.arguments, vec![format!("{} {}", first, second), tail]);
    }

    #[test]
    fn test_switch_values_are_found(
        key in "[a-z]{1,8}",
        value in "[a-z0-9]{0,8}",
        arg in "[a-z]{1,8}",
    ) {
        let request = format!("get {} -{}={}", arg, key, value);
        let parsed = ProvidedArguments::parse(&request, None);
        prop_assert_eq!(parsed.arguments, vec![arg]);
        prop_assert!(contains_switch(&parsed.switches, &key));
        prop_assert_eq!(get_switch_value(&parsed.switches, &key), value);
    }

    #[test]
    fn test_arity_gate(provided in 0usize..6, minimum in 1usize..5) {
        let info = CommandInfo::from_fn("cmd", "Test", |_| Ok(0))
            .with_arguments(CommandArgumentInfo::required(minimum, &["<args>"]));
        let words: Vec<String> = (0..provided).map(|i| format!("a{}", i)).collect();
        let request = format!("cmd {}", words.join(" "));

        let parsed = ProvidedArguments::parse(&request, Some(&info));
        prop_assert_eq!(parsed.required_arguments_provided, provided >= minimum);
    }

    #[test]
    fn test_split_matches_whitespace_split(words in prop::collection::vec("[a-z0-9=-]{1,8}", 0..8)) {
        let text = words.join("   ");
        let split: Vec<String> = split_words(&text).into_iter().map(str::to_string).collect();
        prop_assert_eq!(split, words);
    }
}
