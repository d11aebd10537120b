//! Interactive read-dispatch loop of one shell

use std::sync::Arc;

use crate::error::Result;
use crate::models::ShellType;
use crate::shell::dispatcher::{Dispatcher, ExecuteCommandParameters};
use crate::shell::outcome::DispatchOutcome;
use crate::shell::stack::ShellInstance;

/// Reads lines for one shell instance until it exits or input ends
#[derive(Debug)]
pub struct ShellSession {
    dispatcher: Arc<Dispatcher>,
    shell_type: ShellType,
}

impl ShellSession {
    pub fn new(dispatcher: Arc<Dispatcher>, shell_type: ShellType) -> Self {
        Self {
            dispatcher,
            shell_type,
        }
    }

    /// Push a new shell instance and run it until it exits
    ///
    /// Returns the number of non-empty requests dispatched.
    pub fn run(&self) -> Result<usize> {
        let stack = self.dispatcher.stack().clone();
        let instance = stack.push(self.shell_type, self.dispatcher.config().clone())?;
        let result = self.read_loop(&instance);
        stack.pop(instance.id());
        result
    }

    fn read_loop(&self, instance: &ShellInstance) -> Result<usize> {
        let console = self.dispatcher.console();
        let prompt = self.shell_type.default_prompt();
        let mut dispatched = 0;

        loop {
            let token = instance.begin_prompt();
            let line = console.read_line(&prompt);
            instance.end_prompt();

            let Some(line) = line? else {
                debug!("Input ended for {} shell", self.shell_type);
                break;
            };
            if token.is_cancelled() {
                // The interrupt arrived while waiting; drop what was typed
                self.dispatcher.clear_cancel_request();
                continue;
            }

            let outcome = self
                .dispatcher
                .dispatch(ExecuteCommandParameters::new(&line, self.shell_type));
            if outcome != DispatchOutcome::Empty {
                dispatched += 1;
                trace!("'{}' finished: {}", line.trim(), outcome);
            }

            if instance.is_detaching() {
                break;
            }
        }

        Ok(dispatched)
    }
}
