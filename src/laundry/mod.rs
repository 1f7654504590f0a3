//! Laundry room occupancy
//!
//! Provides:
//! - Machine records and the status cycle (idle, occupied, washing, done)
//! - Partial machine updates
//! - The shared occupancy store binding sessions to machines

mod machine;
mod store;

pub use machine::{Machine, MachineId, MachinePatch, MachineStatus};
pub use store::{LaundryError, OccupancyStore, StoreOptions, MACHINE_COUNT};
