//! Machine records, status labels and partial updates

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Machine identity (1-based, fixed at startup)
pub type MachineId = u32;

/// Lifecycle label of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    /// Free for any session to claim
    #[default]
    Idle,
    /// Bound to a session, cycle not started
    Occupied,
    /// Cycle in progress
    Washing,
    /// Cycle finished, waiting for the occupant to leave
    Done,
}

impl MachineStatus {
    /// Wire name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Idle => "idle",
            MachineStatus::Occupied => "occupied",
            MachineStatus::Washing => "washing",
            MachineStatus::Done => "done",
        }
    }

    /// The state that follows this one in a normal cycle
    pub fn next(&self) -> MachineStatus {
        match self {
            MachineStatus::Idle => MachineStatus::Occupied,
            MachineStatus::Occupied => MachineStatus::Washing,
            MachineStatus::Washing => MachineStatus::Done,
            MachineStatus::Done => MachineStatus::Idle,
        }
    }

    /// Whether moving from `self` to `to` follows the cycle
    /// `idle -> occupied -> washing -> done -> idle`. Staying put is allowed.
    pub fn can_transition_to(&self, to: MachineStatus) -> bool {
        *self == to || self.next() == to
    }

    /// Whether an occupant may move the machine from `self` to `to` through
    /// an update. Entering `idle` or `occupied` belongs to leave and claim.
    pub fn can_update_to(&self, to: MachineStatus) -> bool {
        if *self == to {
            return true;
        }
        match to {
            MachineStatus::Idle | MachineStatus::Occupied => false,
            _ => self.can_transition_to(to),
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One washer slot and the occupancy currently bound to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: MachineId,
    pub status: MachineStatus,
    /// Session holding this machine
    pub occupant_id: Option<String>,
    pub image_url: Option<String>,
    pub result_url: Option<String>,
    /// Unix timestamp (ms) supplied by the client when the cycle started
    pub start_time: Option<i64>,
}

impl Machine {
    /// Create an idle, unoccupied machine
    pub fn new(id: MachineId) -> Self {
        Self {
            id,
            status: MachineStatus::Idle,
            occupant_id: None,
            image_url: None,
            result_url: None,
            start_time: None,
        }
    }

    /// Whether a session may claim this machine
    pub fn is_available(&self) -> bool {
        self.status == MachineStatus::Idle && self.occupant_id.is_none()
    }

    /// Whether this machine is bound to `session_id`
    pub fn is_held_by(&self, session_id: &str) -> bool {
        self.occupant_id.as_deref() == Some(session_id)
    }

    /// Drop the occupancy and all of its metadata
    pub fn reset(&mut self) {
        *self = Self::new(self.id);
    }

    /// Merge the fields present in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: &MachinePatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(result_url) = &patch.result_url {
            self.result_url = result_url.clone();
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
    }
}

/// Partial machine update.
///
/// The outer `Option` tells whether the key was present in the request; for
/// the nullable fields the inner `Option` carries an explicit `null`, which
/// clears the value. Keys such as `id` and `occupantId` are not part of the
/// patch and are ignored when decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachinePatch {
    #[serde(default)]
    pub status: Option<MachineStatus>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub result_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub start_time: Option<Option<i64>>,
}

impl MachinePatch {
    /// Patch that only sets the status
    pub fn status(status: MachineStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(Some(url.into()));
        self
    }

    pub fn with_result_url(mut self, url: impl Into<String>) -> Self {
        self.result_url = Some(Some(url.into()));
        self
    }

    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(Some(start_time));
        self
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.image_url.is_none()
            && self.result_url.is_none()
            && self.start_time.is_none()
    }
}

/// Marks a key as present, keeping `null` as `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
