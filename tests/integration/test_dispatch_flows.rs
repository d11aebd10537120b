//! Integration Tests for Command Dispatch
//!
//! End-to-end flows through the dispatcher: parsing, argument gating,
//! access policy, fault containment and event publication.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use shellstack::config::ExhaustionPolicy;
use shellstack::events::{EventKind, EventPayload};
use shellstack::shell::{CommandMap, RejectReason};
use shellstack::{
    CommandArgumentInfo, CommandBase, CommandContext, CommandFlags, CommandInfo, DispatchOutcome,
    ExecuteCommandParameters, RemoteCommand, RemoteEndpoint, ShellType,
};
use test_utils::{create_test_config, recording_command, TestHarness};

fn echo_harness() -> (TestHarness, test_utils::CallLog) {
    let harness = TestHarness::new();
    let (info, calls) = recording_command("echo", "Prints text");
    harness.add(
        ShellType::Shell,
        info.with_arguments(CommandArgumentInfo::required(1, &["<text>"])),
    );
    harness.enter(ShellType::Shell);
    (harness, calls)
}

#[test]
fn test_echo_runs_with_arguments() {
    let (mut harness, calls) = echo_harness();

    let outcome = harness.dispatch("echo hello", ShellType::Shell);

    assert_eq!(outcome, DispatchOutcome::Completed { exit_code: 0 });
    assert_eq!(*calls.lock(), vec![vec!["hello".to_string()]]);
    assert!(!harness.driver.contains("Usage:"));
    let events = harness.drain_events();
    assert!(events.iter().any(|e| e.kind == EventKind::CommandExecuted));
    assert!(!events.iter().any(|e| e.kind == EventKind::CommandError));
}

#[test]
fn test_quoted_arguments_reach_handler() {
    let (harness, calls) = echo_harness();

    harness.dispatch(r#"echo "hello world" again"#, ShellType::Shell);

    assert_eq!(
        *calls.lock(),
        vec![vec!["hello world".to_string(), "again".to_string()]]
    );
}

#[test]
fn test_missing_arguments_show_usage() {
    let (harness, calls) = echo_harness();

    let outcome = harness.dispatch("echo", ShellType::Shell);

    assert_eq!(outcome, DispatchOutcome::UsageShown);
    assert!(calls.lock().is_empty());
    assert_eq!(harness.driver.lines()[0], "Usage: echo <text>");
    assert!(harness.driver.contains("Prints text"));
}

#[test]
fn test_minimum_argument_count() {
    let harness = TestHarness::new();
    let (info, calls) = recording_command("copy", "Copies a file");
    harness.add(
        ShellType::Shell,
        info.with_arguments(CommandArgumentInfo::required(2, &["<from> <to>"])),
    );
    harness.enter(ShellType::Shell);

    assert_eq!(harness.dispatch("copy a", ShellType::Shell), DispatchOutcome::UsageShown);
    // Switches do not count as positional arguments
    assert_eq!(
        harness.dispatch("copy a -force", ShellType::Shell),
        DispatchOutcome::UsageShown
    );
    assert!(harness.dispatch("copy a b", ShellType::Shell).is_completed());
    assert_eq!(calls.lock().len(), 1);
}

#[test]
fn test_switches_reach_handler() {
    let harness = TestHarness::new();
    let seen = Arc::new(Mutex::new(None));
    let record = seen.clone();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("list", "Lists things", move |ctx| {
            *record.lock() = Some((ctx.has_switch("all"), ctx.switch_value("depth")));
            Ok(0)
        }),
    );
    harness.enter(ShellType::Shell);

    harness.dispatch("list -all -depth=3 docs", ShellType::Shell);

    assert_eq!(*seen.lock(), Some((true, "3".to_string())));
}

#[test]
fn test_exit_code_is_reported() {
    let mut harness = TestHarness::new();
    harness.add(ShellType::Shell, CommandInfo::from_fn("fail", "Exits with 3", |_| Ok(3)));
    harness.enter(ShellType::Shell);
    harness.drain_events();

    let outcome = harness.dispatch("fail", ShellType::Shell);
    assert_eq!(outcome.exit_code(), Some(3));

    let events = harness.drain_events();
    assert!(events.iter().any(|e| matches!(
        &e.payload,
        EventPayload::Command {
            exit_code: Some(3),
            ..
        }
    )));
}

#[test]
fn test_handler_error_is_contained() {
    let mut harness = TestHarness::new();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("broken", "Always fails", |_| anyhow::bail!("disk full")),
    );
    harness.add(ShellType::Shell, CommandInfo::from_fn("ok", "Works", |_| Ok(0)));
    harness.enter(ShellType::Shell);

    let outcome = harness.dispatch("broken now", ShellType::Shell);
    let DispatchOutcome::Faulted(fault) = outcome else {
        panic!("expected a fault, got {:?}", outcome);
    };
    assert_eq!(fault.kind, "Error");
    assert_eq!(fault.message, "disk full");
    assert_eq!(fault.request, "broken now");
    assert!(harness
        .driver
        .contains("There was an error in the command broken: Error: disk full"));

    let events = harness.drain_events();
    assert!(events.iter().any(|e| e.kind == EventKind::CommandError));

    assert!(harness.dispatch("ok", ShellType::Shell).is_completed());
}

#[test]
fn test_handler_panic_is_contained() {
    let harness = TestHarness::new();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("explode", "Panics", |_| panic!("boom")),
    );
    harness.add(ShellType::Shell, CommandInfo::from_fn("ok", "Works", |_| Ok(0)));
    let instance = harness.enter(ShellType::Shell);

    let outcome = harness.dispatch("explode", ShellType::Shell);
    assert!(matches!(
        &outcome,
        DispatchOutcome::Faulted(fault) if fault.kind == "Panic" && fault.message == "boom"
    ));

    // The same primary worker keeps serving the shell
    assert_eq!(instance.pool().primary_name(), "shell-cmd-0");
    assert!(harness.dispatch("ok", ShellType::Shell).is_completed());
}

#[test]
fn test_obsolete_command_warns_and_runs() {
    let harness = TestHarness::new();
    let (info, calls) = recording_command("old", "Legacy");
    harness.add(ShellType::Shell, info.with_flags(CommandFlags::OBSOLETE));
    harness.enter(ShellType::Shell);

    assert!(harness.dispatch("old", ShellType::Shell).is_completed());
    assert_eq!(calls.lock().len(), 1);
    assert!(harness
        .driver
        .contains("The command old is obsolete and will be removed in a future release."));
}

#[test]
fn test_strict_command_requires_administrator() {
    let harness = TestHarness::new();
    let (info, calls) = recording_command("reboot", "Restarts");
    harness.add(ShellType::Shell, info.with_flags(CommandFlags::STRICT));
    harness.enter(ShellType::Shell);

    assert_eq!(harness.dispatch("reboot", ShellType::Shell), DispatchOutcome::Denied);
    assert!(harness
        .driver
        .contains("The requested command reboot is only available to administrators."));
    assert!(calls.lock().is_empty());

    harness.runtime.policy().set_administrator(true);
    assert!(harness.dispatch("reboot", ShellType::Shell).is_completed());
    assert_eq!(calls.lock().len(), 1);
}

#[test]
fn test_maintenance_mode_blocks_command() {
    let harness = TestHarness::new();
    let (info, calls) = recording_command("publish", "Publishes");
    harness.add(ShellType::Shell, info.with_flags(CommandFlags::NO_MAINTENANCE));
    harness.enter(ShellType::Shell);
    harness.runtime.policy().set_maintenance_mode(true);

    assert_eq!(harness.dispatch("publish", ShellType::Shell), DispatchOutcome::Denied);
    assert!(harness
        .driver
        .contains("The requested command publish is not available in maintenance mode."));

    harness.runtime.policy().set_maintenance_mode(false);
    assert!(harness.dispatch("publish", ShellType::Shell).is_completed());
    assert_eq!(calls.lock().len(), 1);
}

#[test]
fn test_unknown_and_empty_requests() {
    let mut harness = TestHarness::new();
    harness.enter(ShellType::Shell);
    harness.drain_events();

    assert_eq!(harness.dispatch("   ", ShellType::Shell), DispatchOutcome::Empty);
    assert!(harness.driver.lines().is_empty());

    assert_eq!(harness.dispatch("frobnicate x", ShellType::Shell), DispatchOutcome::NotFound);
    assert!(harness
        .driver
        .contains("Command frobnicate not found. See \"help\" for more information."));
    assert!(harness.drain_events().is_empty());
}

#[test]
fn test_no_instance_of_shell_type() {
    let harness = TestHarness::new();
    let (info, calls) = recording_command("get", "Download");
    harness.add(ShellType::Ftp, info);
    harness.enter(ShellType::Shell);

    assert_eq!(
        harness.dispatch("get file", ShellType::Ftp),
        DispatchOutcome::Rejected(RejectReason::NoShellInstance)
    );
    assert!(calls.lock().is_empty());
}

#[test]
fn test_alias_runs_target() {
    let (harness, calls) = echo_harness();
    harness.runtime.registry().add_alias(ShellType::Shell, "say", "echo").unwrap();

    assert!(harness.dispatch("say hi", ShellType::Shell).is_completed());
    assert_eq!(*calls.lock(), vec![vec!["hi".to_string()]]);
}

#[test]
fn test_custom_commands_take_precedence() {
    let (harness, registry_calls) = echo_harness();
    let (custom, custom_calls) = recording_command("echo", "Session echo");
    let mut commands: CommandMap = HashMap::new();
    commands.insert("echo".to_string(), Arc::new(custom));

    let params = ExecuteCommandParameters::new("echo custom", ShellType::Shell)
        .with_custom_commands(Arc::new(commands));
    assert!(harness.runtime.dispatcher().dispatch(params).is_completed());

    assert_eq!(*custom_calls.lock(), vec![vec!["custom".to_string()]]);
    assert!(registry_calls.lock().is_empty());
}

struct Whoami {
    seen: Arc<Mutex<Vec<String>>>,
}

impl CommandBase for Whoami {
    fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<i32> {
        self.seen.lock().push("local".to_string());
        Ok(0)
    }
}

impl RemoteCommand for Whoami {
    fn execute_remote(&self, _ctx: &CommandContext, remote: &RemoteEndpoint) -> anyhow::Result<i32> {
        self.seen.lock().push(remote.address().to_string());
        Ok(0)
    }
}

#[test]
fn test_remote_capable_handler() {
    let harness = TestHarness::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    harness.add(
        ShellType::Debug,
        CommandInfo::remote("whoami", "Shows the caller", Whoami { seen: seen.clone() }),
    );
    harness.enter(ShellType::Debug);

    harness.dispatch("whoami", ShellType::Debug);
    let params = ExecuteCommandParameters::new("whoami", ShellType::Debug)
        .with_remote(RemoteEndpoint::new("10.0.0.7:4000", Vec::<u8>::new()));
    harness.runtime.dispatcher().dispatch(params);

    assert_eq!(*seen.lock(), vec!["local", "10.0.0.7:4000"]);
}

#[test]
fn test_nested_dispatch_uses_alternate_worker() {
    let harness = TestHarness::new();
    let threads = Arc::new(Mutex::new(Vec::new()));

    let inner_threads = threads.clone();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("inner", "Inner", move |_| {
            inner_threads
                .lock()
                .push(thread::current().name().unwrap_or_default().to_string());
            Ok(7)
        }),
    );
    let outer_threads = threads.clone();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("outer", "Outer", move |ctx| {
            outer_threads
                .lock()
                .push(thread::current().name().unwrap_or_default().to_string());
            Ok(ctx.dispatch("inner").exit_code().unwrap_or(-1))
        }),
    );
    harness.enter(ShellType::Shell);

    let outcome = harness.dispatch("outer", ShellType::Shell);

    assert_eq!(outcome, DispatchOutcome::Completed { exit_code: 7 });
    assert_eq!(*threads.lock(), vec!["shell-cmd-0", "shell-cmd-1"]);
}

#[test]
fn test_exhausted_pool_rejects() {
    let mut config = create_test_config();
    config.dispatch.alternate_threads = 1;
    config.dispatch.exhaustion_policy = ExhaustionPolicy::Reject;
    let harness = TestHarness::with_config(config);
    let innermost = Arc::new(Mutex::new(None));

    harness.add(ShellType::Shell, CommandInfo::from_fn("leaf", "Leaf", |_| Ok(0)));
    let record = innermost.clone();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("middle", "Middle", move |ctx| {
            *record.lock() = Some(ctx.dispatch("leaf"));
            Ok(0)
        }),
    );
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("top", "Top", |ctx| {
            ctx.dispatch("middle");
            Ok(0)
        }),
    );
    harness.enter(ShellType::Shell);

    assert!(harness.dispatch("top", ShellType::Shell).is_completed());
    assert_eq!(
        *innermost.lock(),
        Some(DispatchOutcome::Rejected(RejectReason::NoThreadAvailable))
    );
}

#[test]
fn test_exhausted_pool_grows() {
    let mut config = create_test_config();
    config.dispatch.alternate_threads = 1;
    config.dispatch.max_alternate_threads = 2;
    let harness = TestHarness::with_config(config);
    let innermost = Arc::new(Mutex::new(None));

    let record = innermost.clone();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("leaf", "Leaf", move |_| {
            *record.lock() = thread::current().name().map(str::to_string);
            Ok(0)
        }),
    );
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("middle", "Middle", |ctx| Ok(ctx.dispatch("leaf").exit_code().unwrap_or(-1))),
    );
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("top", "Top", |ctx| Ok(ctx.dispatch("middle").exit_code().unwrap_or(-1))),
    );
    let instance = harness.enter(ShellType::Shell);

    assert_eq!(harness.dispatch("top", ShellType::Shell), DispatchOutcome::Completed { exit_code: 0 });
    assert_eq!(innermost.lock().as_deref(), Some("shell-cmd-2"));
    assert_eq!(instance.pool().alternate_count(), 2);
}
