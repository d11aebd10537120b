//! Live shell instances
//!
//! Shells nest: entering the FTP shell from the main shell pushes a new
//! instance on top of the stack, and only the top instance reads raw input.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::events::{EventBus, EventKind, EventPayload};
use crate::models::ShellType;
use crate::shell::pool::ExecutionPool;

/// One live shell on the stack
#[derive(Debug)]
pub struct ShellInstance {
    id: Uuid,
    shell_type: ShellType,
    started_at: DateTime<Utc>,
    pool: ExecutionPool,
    detaching: AtomicBool,
    prompt_token: Mutex<Option<CancellationToken>>,
}

impl ShellInstance {
    /// Create an instance with its own worker pool
    pub fn new(shell_type: ShellType, config: DispatchConfig) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            shell_type,
            started_at: Utc::now(),
            pool: ExecutionPool::new(shell_type, config)?,
            detaching: AtomicBool::new(false),
            prompt_token: Mutex::new(None),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn shell_type(&self) -> ShellType {
        self.shell_type
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn pool(&self) -> &ExecutionPool {
        &self.pool
    }

    /// Ask the session loop to leave this shell after the current command
    pub fn request_exit(&self) {
        self.detaching.store(true, Ordering::SeqCst);
    }

    pub fn is_detaching(&self) -> bool {
        self.detaching.load(Ordering::SeqCst)
    }

    /// Track the token of the prompt currently waiting for input
    pub fn begin_prompt(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.prompt_token.lock() = Some(token.clone());
        token
    }

    pub fn end_prompt(&self) {
        self.prompt_token.lock().take();
    }

    /// Cancel the pending prompt, returning whether one was tracked
    pub fn cancel_prompt(&self) -> bool {
        match self.prompt_token.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// Stack of nested shell instances, top last
#[derive(Debug)]
pub struct ShellStack {
    instances: RwLock<Vec<Arc<ShellInstance>>>,
    events: Arc<EventBus>,
}

impl ShellStack {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            instances: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Create an instance of `shell_type` and make it the current shell
    pub fn push(&self, shell_type: ShellType, config: DispatchConfig) -> Result<Arc<ShellInstance>> {
        let instance = Arc::new(ShellInstance::new(shell_type, config)?);
        let depth = {
            let mut instances = self.instances.write();
            instances.push(instance.clone());
            instances.len()
        };

        info!("Entered {} shell (depth {})", shell_type, depth);
        self.events.fire(
            EventKind::ShellEntered,
            EventPayload::Shell {
                shell_type,
                instance_id: instance.id(),
                depth,
            },
            "shell_stack",
        );
        Ok(instance)
    }

    /// Remove an instance, cancelling anything still running in it
    pub fn pop(&self, id: Uuid) -> Option<Arc<ShellInstance>> {
        let (instance, depth) = {
            let mut instances = self.instances.write();
            let index = instances.iter().rposition(|instance| instance.id() == id)?;
            let instance = instances.remove(index);
            (instance, instances.len())
        };

        instance.pool().cancel_active();
        info!("Exited {} shell (depth {})", instance.shell_type(), depth);
        self.events.fire(
            EventKind::ShellExited,
            EventPayload::Shell {
                shell_type: instance.shell_type(),
                instance_id: id,
                depth,
            },
            "shell_stack",
        );
        Some(instance)
    }

    /// Current shell
    pub fn current(&self) -> Option<Arc<ShellInstance>> {
        self.instances.read().last().cloned()
    }

    /// Topmost instance of a shell type
    pub fn top_of_type(&self, shell_type: ShellType) -> Option<Arc<ShellInstance>> {
        self.instances
            .read()
            .iter()
            .rev()
            .find(|instance| instance.shell_type() == shell_type)
            .cloned()
    }

    pub fn depth(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// Shell types from bottom to top
    pub fn shell_types(&self) -> Vec<ShellType> {
        self.instances
            .read()
            .iter()
            .map(|instance| instance.shell_type())
            .collect()
    }
}
