//! Authorization and mode queries consumed by dispatch and help

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SessionConfig;

/// Answers who the current user is allowed to be
pub trait AccessPolicy: Send + Sync {
    /// Whether the current user holds administrator capability
    fn is_administrator(&self) -> bool;

    /// Whether the system is in maintenance mode
    fn maintenance_mode(&self) -> bool;
}

/// Policy backed by runtime-adjustable flags
#[derive(Debug, Default)]
pub struct SessionPolicy {
    administrator: AtomicBool,
    maintenance: AtomicBool,
}

impl SessionPolicy {
    pub fn new(administrator: bool, maintenance: bool) -> Self {
        Self {
            administrator: AtomicBool::new(administrator),
            maintenance: AtomicBool::new(maintenance),
        }
    }

    /// Build from the session section of the configuration
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.administrator, config.maintenance_mode)
    }

    pub fn set_administrator(&self, value: bool) {
        self.administrator.store(value, Ordering::SeqCst);
    }

    pub fn set_maintenance_mode(&self, value: bool) {
        self.maintenance.store(value, Ordering::SeqCst);
    }
}

impl AccessPolicy for SessionPolicy {
    fn is_administrator(&self) -> bool {
        self.administrator.load(Ordering::SeqCst)
    }

    fn maintenance_mode(&self) -> bool {
        self.maintenance.load(Ordering::SeqCst)
    }
}
