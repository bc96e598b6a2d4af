//! Network interface admin-state control.
//!
//! The cooldown manager only ever asks for a desired state ("this interface
//! should be enabled/disabled"). Calls are idempotent so the poll loop can
//! safely re-issue one that failed.

mod memory;

pub use memory::MemoryControl;

use serde::{Deserialize, Serialize};
use std::process::Command;

use crate::error::NetworkError;

pub trait NetworkControl: Send + Sync {
    /// Set the administrative state of `interface`.
    fn set_interface_admin(&self, interface: &str, enabled: bool) -> Result<(), NetworkError>;
}

/// Which [`NetworkControl`] the nudger runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkBackend {
    /// `netsh interface set interface <name> admin=...`
    #[default]
    Netsh,
    /// Log the toggle without touching the machine.
    DryRun,
}

impl NetworkBackend {
    /// Whether this backend needs administrator rights.
    pub fn needs_elevation(self) -> bool {
        matches!(self, NetworkBackend::Netsh)
    }

    pub fn build(self) -> Box<dyn NetworkControl> {
        match self {
            NetworkBackend::Netsh => Box::new(NetshControl),
            NetworkBackend::DryRun => Box::new(DryRunControl),
        }
    }
}

/// Toggles the interface through `netsh`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetshControl;

impl NetshControl {
    pub const PROGRAM: &'static str = "netsh";

    pub fn args(interface: &str, enabled: bool) -> [String; 5] {
        let admin = if enabled { "admin=enable" } else { "admin=disable" };
        [
            "interface".into(),
            "set".into(),
            "interface".into(),
            interface.into(),
            admin.into(),
        ]
    }
}

impl NetworkControl for NetshControl {
    fn set_interface_admin(&self, interface: &str, enabled: bool) -> Result<(), NetworkError> {
        let status = Command::new(Self::PROGRAM)
            .args(Self::args(interface, enabled))
            .status()
            .map_err(|source| NetworkError::Spawn {
                program: Self::PROGRAM.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(NetworkError::CommandFailed {
                interface: interface.to_string(),
                enabled,
                status: status.to_string(),
            })
        }
    }
}

/// Pretends every toggle succeeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunControl;

impl NetworkControl for DryRunControl {
    fn set_interface_admin(&self, interface: &str, enabled: bool) -> Result<(), NetworkError> {
        tracing::info!(interface, enabled, "dry run: interface admin-state not changed");
        Ok(())
    }
}
