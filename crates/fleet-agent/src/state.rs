//! Per-agent movement state.

use std::fmt;

/// Where a transporter is in its task cycle.
///
/// ```text
/// Idle ─► Moving ─► Arrived ─► Loading ─┬─► Moving   (picked up at origin)
///  ▲                                    └─► Idle     (dropped off)
///  └──────────── Charging ◄── Idle (downtime due)
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementState {
    #[default]
    Idle,
    Moving,
    Arrived,
    Loading,
    Charging,
}

impl MovementState {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementState::Idle => "idle",
            MovementState::Moving => "moving",
            MovementState::Arrived => "arrived",
            MovementState::Loading => "loading",
            MovementState::Charging => "charging",
        }
    }
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
