//! Event Handling and Message Passing
//!
//! Broadcast event bus used to publish command outcomes and shell stack
//! changes to the rest of the system. Publishing never blocks and never
//! fails when nobody is listening.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::ShellType;
use crate::shell::HandlerFault;

/// Default number of buffered events per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Kind of a published event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A command handler returned normally
    CommandExecuted,
    /// A command handler failed
    CommandError,
    /// A command was cancelled
    CommandCancelled,
    /// A shell instance was pushed on the stack
    ShellEntered,
    /// A shell instance was popped off the stack
    ShellExited,
}

/// Event payload types
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// Command lifecycle
    Command {
        shell_type: ShellType,
        request: String,
        exit_code: Option<i32>,
    },
    /// Command handler fault
    CommandError {
        shell_type: ShellType,
        request: String,
        fault: HandlerFault,
    },
    /// Shell stack change
    Shell {
        shell_type: ShellType,
        instance_id: Uuid,
        depth: usize,
    },
}

/// Event envelope with metadata
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    /// Event ID
    pub id: String,
    /// Event kind
    pub kind: EventKind,
    /// Event payload
    pub payload: EventPayload,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Source component
    pub source: String,
}

impl EventEnvelope {
    /// Create event envelope
    pub fn new(kind: EventKind, payload: EventPayload, source: &str) -> Self {
        Self {
            id: generate_event_id(),
            kind,
            payload,
            timestamp: Utc::now(),
            source: source.to_string(),
        }
    }
}

/// Event bus for application-wide notifications
#[derive(Debug)]
pub struct EventBus {
    broadcast_tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create new event bus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(capacity.max(1));
        Self { broadcast_tx }
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        trace!("Publishing event {:?} from {}", envelope.kind, envelope.source);
        // No subscribers is not an error
        self.broadcast_tx.send(envelope).unwrap_or(0)
    }

    /// Build and publish an event
    pub fn fire(&self, kind: EventKind, payload: EventPayload, source: &str) -> usize {
        self.publish(EventEnvelope::new(kind, payload, source))
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.broadcast_tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.broadcast_tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Generate unique event ID
fn generate_event_id() -> String {
    format!("evt_{}", Uuid::new_v4().simple())
}
