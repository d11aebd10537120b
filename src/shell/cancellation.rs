//! Interrupt handling
//!
//! An interrupt cancels what the current shell is doing without touching
//! the shell stack. Each shell type has its own lock, so cancelling one
//! shell never blocks or disturbs another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::console::{Console, NullDriver};
use crate::models::ShellType;
use crate::shell::dispatcher::Dispatcher;
use crate::shell::registry::CommandRegistry;
use crate::shell::stack::ShellStack;

/// What one cancellation request reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelReport {
    /// Shell type that was cancelled, `None` when nothing was on the stack
    pub shell_type: Option<ShellType>,
    /// Running commands whose tokens were cancelled
    pub commands: usize,
    /// Whether a pending prompt was cancelled
    pub prompt: bool,
}

/// Cancels running commands of the current shell
pub struct CancellationController {
    registry: Arc<CommandRegistry>,
    stack: Arc<ShellStack>,
    console: Arc<Console>,
    cancel_requested: Arc<AtomicBool>,
}

impl CancellationController {
    pub fn new(dispatcher: &Dispatcher) -> Self {
        Self {
            registry: dispatcher.registry().clone(),
            stack: dispatcher.stack().clone(),
            console: dispatcher.console_handle(),
            cancel_requested: dispatcher.cancel_flag(),
        }
    }

    /// Cancel the shell on top of the stack
    pub fn cancel_current(&self) -> CancelReport {
        match self.stack.current() {
            Some(instance) => self.cancel_shell(instance.shell_type()),
            None => {
                debug!("Cancellation requested with no shell on the stack");
                CancelReport::default()
            }
        }
    }

    /// Cancel the topmost instance of `shell_type`
    pub fn cancel_shell(&self, shell_type: ShellType) -> CancelReport {
        let Some(instance) = self.stack.top_of_type(shell_type) else {
            debug!("No {} shell to cancel", shell_type);
            return CancelReport::default();
        };
        let shell = match self.registry.shell_info(shell_type) {
            Ok(shell) => shell,
            Err(e) => {
                warn!("Cannot cancel {} shell: {}", shell_type, e);
                return CancelReport::default();
            }
        };

        let _lock = shell.lock();
        self.cancel_requested.store(true, Ordering::SeqCst);
        let commands = {
            // Input and output are parked until the tokens are cancelled
            let _driver = self.console.swap_driver(Arc::new(NullDriver));
            instance.pool().cancel_active()
        };
        let prompt = instance.cancel_prompt();

        if commands == 0 {
            // Nothing will report back to clear the request
            self.cancel_requested.store(false, Ordering::SeqCst);
        }
        info!(
            "Cancellation of {} shell reached {} command(s), prompt: {}",
            shell_type, commands, prompt
        );

        CancelReport {
            shell_type: Some(shell_type),
            commands,
            prompt,
        }
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub fn clear_request(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for CancellationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationController")
            .field("cancel_requested", &self.is_cancel_requested())
            .finish()
    }
}
