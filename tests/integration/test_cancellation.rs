//! Integration Tests for Cancellation
//!
//! Interrupts reach the running commands of one shell type, leave other
//! shells alone and never leave a shell without a usable worker.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::thread;
use std::time::{Duration, Instant};

use shellstack::events::EventKind;
use shellstack::shell::CancelReport;
use shellstack::{CommandInfo, DispatchOutcome, ShellType};
use test_utils::TestHarness;

fn sleeper(name: &str, duration: Duration) -> CommandInfo {
    CommandInfo::from_fn(name, "Sleeps", move |ctx| {
        ctx.sleep(duration)?;
        Ok(0)
    })
}

fn spawn_dispatch(
    harness: &TestHarness,
    request: &'static str,
    shell_type: ShellType,
) -> thread::JoinHandle<DispatchOutcome> {
    let dispatcher = harness.runtime.dispatcher().clone();
    thread::spawn(move || dispatcher.dispatch_line(request, shell_type))
}

#[test]
fn test_interrupt_cancels_running_command() {
    let mut harness = TestHarness::new();
    harness.add(ShellType::Shell, sleeper("sleep", Duration::from_secs(10)));
    let instance = harness.enter(ShellType::Shell);

    let started = Instant::now();
    let handle = spawn_dispatch(&harness, "sleep", ShellType::Shell);
    harness.wait_for("sleep to start", || instance.pool().active_count() == 1);

    let report = harness.runtime.cancellation().cancel_current();
    assert_eq!(report.shell_type, Some(ShellType::Shell));
    assert_eq!(report.commands, 1);

    assert_eq!(handle.join().unwrap(), DispatchOutcome::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!harness.runtime.cancellation().is_cancel_requested());
    assert_eq!(instance.pool().active_count(), 0);

    let events = harness.drain_events();
    assert!(events.iter().any(|e| e.kind == EventKind::CommandCancelled));
    assert!(!events.iter().any(|e| e.kind == EventKind::CommandError));
}

#[test]
fn test_console_driver_is_restored() {
    let harness = TestHarness::new();
    harness.add(ShellType::Shell, sleeper("sleep", Duration::from_secs(10)));
    let instance = harness.enter(ShellType::Shell);

    let handle = spawn_dispatch(&harness, "sleep", ShellType::Shell);
    harness.wait_for("sleep to start", || instance.pool().active_count() == 1);
    harness.runtime.cancellation().cancel_current();
    handle.join().unwrap();

    let console = harness.runtime.dispatcher().console();
    assert_eq!(console.driver().name(), "memory");
}

#[test]
fn test_cancelling_one_shell_leaves_others_running() {
    let harness = TestHarness::new();
    harness.add(ShellType::Shell, sleeper("work", Duration::from_millis(300)));
    harness.add(ShellType::Ftp, sleeper("transfer", Duration::from_secs(10)));
    let shell = harness.enter(ShellType::Shell);
    let ftp = harness.enter(ShellType::Ftp);

    let work = spawn_dispatch(&harness, "work", ShellType::Shell);
    let transfer = spawn_dispatch(&harness, "transfer", ShellType::Ftp);
    harness.wait_for("both commands to start", || {
        shell.pool().active_count() == 1 && ftp.pool().active_count() == 1
    });

    let report = harness.runtime.cancellation().cancel_shell(ShellType::Ftp);
    assert_eq!(report.commands, 1);

    assert_eq!(transfer.join().unwrap(), DispatchOutcome::Cancelled);
    assert_eq!(work.join().unwrap(), DispatchOutcome::Completed { exit_code: 0 });
}

#[test]
fn test_nested_commands_are_cancelled_together() {
    let harness = TestHarness::new();
    harness.add(ShellType::Shell, sleeper("inner", Duration::from_secs(10)));
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("outer", "Runs inner", |ctx| {
            ctx.dispatch("inner");
            ctx.checkpoint()?;
            Ok(0)
        }),
    );
    let instance = harness.enter(ShellType::Shell);

    let handle = spawn_dispatch(&harness, "outer", ShellType::Shell);
    harness.wait_for("both commands to start", || instance.pool().active_count() == 2);

    let report = harness.runtime.cancellation().cancel_current();
    assert_eq!(report.commands, 2);
    assert_eq!(handle.join().unwrap(), DispatchOutcome::Cancelled);
}

#[test]
fn test_stuck_command_is_abandoned() {
    let harness = TestHarness::new();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("stuck", "Ignores cancellation", |_| {
            thread::sleep(Duration::from_millis(1500));
            Ok(0)
        }),
    );
    harness.add(ShellType::Shell, CommandInfo::from_fn("ok", "Works", |_| Ok(0)));
    let instance = harness.enter(ShellType::Shell);
    assert_eq!(instance.pool().primary_name(), "shell-cmd-0");

    let handle = spawn_dispatch(&harness, "stuck", ShellType::Shell);
    harness.wait_for("stuck to start", || instance.pool().active_count() == 1);

    let cancelled_at = Instant::now();
    harness.runtime.cancellation().cancel_current();
    assert_eq!(handle.join().unwrap(), DispatchOutcome::Cancelled);
    assert!(cancelled_at.elapsed() < Duration::from_millis(1200));

    // The primary was replaced and serves the next command right away
    assert_ne!(instance.pool().primary_name(), "shell-cmd-0");
    assert!(harness.dispatch("ok", ShellType::Shell).is_completed());
}

#[test]
fn test_request_cleared_when_command_finishes_anyway() {
    let harness = TestHarness::new();
    harness.add(
        ShellType::Shell,
        CommandInfo::from_fn("slow", "Ignores cancellation briefly", |_| {
            thread::sleep(Duration::from_millis(150));
            Ok(0)
        }),
    );
    let instance = harness.enter(ShellType::Shell);

    let handle = spawn_dispatch(&harness, "slow", ShellType::Shell);
    harness.wait_for("slow to start", || instance.pool().active_count() == 1);

    let report = harness.runtime.cancellation().cancel_current();
    assert_eq!(report.commands, 1);

    // Returned within the grace period, so the outcome stands
    assert_eq!(handle.join().unwrap(), DispatchOutcome::Completed { exit_code: 0 });
    assert!(!harness.runtime.cancellation().is_cancel_requested());
    assert!(!harness.runtime.dispatcher().is_cancel_requested());
}

#[test]
fn test_interrupt_with_nothing_running() {
    let harness = TestHarness::new();
    harness.enter(ShellType::Shell);

    let report = harness.runtime.cancellation().cancel_current();
    assert_eq!(
        report,
        CancelReport {
            shell_type: Some(ShellType::Shell),
            commands: 0,
            prompt: false,
        }
    );
    assert!(!harness.runtime.cancellation().is_cancel_requested());
}

#[test]
fn test_interrupt_with_empty_stack() {
    let harness = TestHarness::new();

    assert_eq!(harness.runtime.cancellation().cancel_current(), CancelReport::default());
    assert_eq!(
        harness.runtime.cancellation().cancel_shell(ShellType::Ftp),
        CancelReport::default()
    );
}
