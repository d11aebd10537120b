//! Contract Tests for the Command Registry
//!
//! The merged view of a shell is its built-in table overlaid with the
//! unified table, and lookups honor unified, built-in, mod, alias order.

use shellstack::shell::{CommandRegistry, CommandSource};
use shellstack::{CommandInfo, Error, ShellType};

fn command(name: &str, description: &str) -> CommandInfo {
    CommandInfo::from_fn(name, description, |_| Ok(0))
}

fn registry() -> CommandRegistry {
    CommandRegistry::with_all_shells()
}

#[test]
fn test_unified_entry_wins_in_every_shell() {
    let registry = registry();
    for shell_type in ShellType::ALL {
        registry
            .add_command(shell_type, command("clear", "Shell clear"))
            .unwrap();
    }
    registry
        .add_unified_command(command("clear", "Unified clear"))
        .unwrap();

    for shell_type in ShellType::ALL {
        let merged = registry.get_commands(shell_type);
        assert_eq!(merged["clear"].description, "Unified clear", "{}", shell_type);
    }
}

#[test]
fn test_merged_view_keeps_other_builtins() {
    let registry = registry();
    registry.add_command(ShellType::Ftp, command("get", "Download")).unwrap();
    registry.add_command(ShellType::Ftp, command("put", "Upload")).unwrap();
    registry.add_unified_command(command("help", "Help")).unwrap();

    let mut names: Vec<String> = registry.get_commands(ShellType::Ftp).into_keys().collect();
    names.sort();
    assert_eq!(names, vec!["get", "help", "put"]);

    let names: Vec<String> = registry.get_commands(ShellType::Mail).into_keys().collect();
    assert_eq!(names, vec!["help"]);
}

#[test]
fn test_lookup_order() {
    let registry = registry();
    registry.add_command(ShellType::Shell, command("list", "Built-in")).unwrap();
    registry.add_mod_command(ShellType::Shell, command("weather", "Mod")).unwrap();
    registry.add_alias(ShellType::Shell, "dir", "list").unwrap();
    registry.add_unified_command(command("exit", "Unified")).unwrap();

    let source = |name: &str| registry.resolve(name, ShellType::Shell).map(|r| r.source);
    assert_eq!(source("list"), Some(CommandSource::BuiltIn));
    assert_eq!(source("weather"), Some(CommandSource::Mod));
    assert_eq!(
        source("dir"),
        Some(CommandSource::Alias {
            target: "list".to_string()
        })
    );
    assert_eq!(source("exit"), Some(CommandSource::Unified));
    assert_eq!(source("missing"), None);
}

#[test]
fn test_found_checks() {
    let registry = registry();
    registry.add_command(ShellType::Rss, command("feeds", "Feeds")).unwrap();
    registry.add_unified_command(command("version", "Version")).unwrap();

    assert!(registry.is_command_found("feeds", ShellType::Rss));
    assert!(!registry.is_command_found("feeds", ShellType::Ftp));
    assert!(registry.is_command_found("version", ShellType::Ftp));
    assert!(registry.is_command_found_anywhere("feeds"));
    assert!(!registry.is_command_found_anywhere("unknown"));
}

#[test]
fn test_duplicates_are_rejected() {
    let registry = registry();
    registry.add_command(ShellType::Shell, command("a", "First")).unwrap();
    registry.add_unified_command(command("u", "First")).unwrap();

    assert!(matches!(
        registry.add_command(ShellType::Shell, command("a", "Second")),
        Err(Error::DuplicateCommand { .. })
    ));
    assert!(matches!(
        registry.add_unified_command(command("u", "Second")),
        Err(Error::DuplicateCommand { .. })
    ));
    assert!(registry.add_mod_command(ShellType::Shell, command("a", "Mod")).is_err());
    // Same name in another shell is fine
    registry.add_command(ShellType::Ftp, command("a", "Other shell")).unwrap();
}

#[test]
fn test_mod_lifecycle() {
    let registry = registry();
    registry.add_mod_command(ShellType::Json, command("pretty", "Format")).unwrap();
    assert!(registry.is_command_found("pretty", ShellType::Json));

    assert!(registry.remove_mod_command(ShellType::Json, "pretty"));
    assert!(!registry.is_command_found("pretty", ShellType::Json));
}
