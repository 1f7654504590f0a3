//! In-memory occupancy store
//!
//! Owns the fixed set of machines and the session bound to each. Every
//! operation runs as one critical section, so a claim's check-then-bind
//! cannot interleave with another handler.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::machine::{Machine, MachineId, MachinePatch, MachineStatus};

/// Number of machines in the laundry room
pub const MACHINE_COUNT: MachineId = 3;

/// Occupancy errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaundryError {
    #[error("All machines occupied")]
    Full,

    #[error("Machine not found for session")]
    NotFound,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: MachineStatus,
        to: MachineStatus,
    },
}

/// Store settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject `update` status changes that skip or reverse the cycle
    pub enforce_transitions: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            enforce_transitions: true,
        }
    }
}

/// Machine occupancy store shared by all request handlers
#[derive(Debug)]
pub struct OccupancyStore {
    machines: Mutex<Vec<Machine>>,
    options: StoreOptions,
}

impl OccupancyStore {
    /// Create a store with all machines idle
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        let machines = (1..=MACHINE_COUNT).map(Machine::new).collect();
        Self {
            machines: Mutex::new(machines),
            options,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Snapshot of every machine, in id order
    pub fn list_all(&self) -> Vec<Machine> {
        self.machines.lock().clone()
    }

    /// Snapshot of one machine
    pub fn get(&self, id: MachineId) -> Option<Machine> {
        self.machines.lock().iter().find(|m| m.id == id).cloned()
    }

    /// Bind `session_id` to a machine.
    ///
    /// A session that already holds a machine gets the same id back, so one
    /// session never occupies two machines. Otherwise the lowest-numbered
    /// idle machine is taken.
    pub fn claim(&self, session_id: &str) -> Result<MachineId, LaundryError> {
        let mut machines = self.machines.lock();

        if let Some(existing) = machines.iter().find(|m| m.is_held_by(session_id)) {
            debug!("Session {} re-claimed machine {}", session_id, existing.id);
            return Ok(existing.id);
        }

        match machines.iter_mut().find(|m| m.is_available()) {
            Some(machine) => {
                machine.occupant_id = Some(session_id.to_string());
                machine.status = MachineStatus::Occupied;
                info!("Session {} claimed machine {}", session_id, machine.id);
                Ok(machine.id)
            }
            None => {
                warn!("Session {} turned away, all machines occupied", session_id);
                Err(LaundryError::Full)
            }
        }
    }

    /// Merge `patch` into the machine bound to `session_id`.
    ///
    /// Nothing is written when the session holds no machine or when the
    /// status change is rejected. With transitions enforced, an update can
    /// only advance `occupied -> washing -> done`; claim and leave own the
    /// steps into `occupied` and `idle`.
    pub fn update(&self, session_id: &str, patch: &MachinePatch) -> Result<Machine, LaundryError> {
        let mut machines = self.machines.lock();

        let machine = machines
            .iter_mut()
            .find(|m| m.is_held_by(session_id))
            .ok_or(LaundryError::NotFound)?;

        if let Some(to) = patch.status {
            let from = machine.status;
            if self.options.enforce_transitions && !from.can_update_to(to) {
                return Err(LaundryError::InvalidTransition { from, to });
            }
        }

        machine.apply(patch);
        debug!(
            "Session {} updated machine {} (status {})",
            session_id, machine.id, machine.status
        );
        Ok(machine.clone())
    }

    /// Release whatever machine `session_id` holds.
    ///
    /// Returns the released machine id, or `None` if the session held nothing.
    pub fn leave(&self, session_id: &str) -> Option<MachineId> {
        let mut machines = self.machines.lock();

        let machine = machines.iter_mut().find(|m| m.is_held_by(session_id))?;
        machine.reset();
        info!("Session {} left machine {}", session_id, machine.id);
        Some(machine.id)
    }
}

impl Default for OccupancyStore {
    fn default() -> Self {
        Self::new()
    }
}
