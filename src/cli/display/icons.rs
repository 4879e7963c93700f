//! Status icons for CLI output

use crate::infrastructure::oci::ContainerState;

/// Status icons for node states
pub struct StatusIcon;

impl StatusIcon {
    /// Node is running
    pub const SUCCESS: &'static str = "✓";

    /// Paused or in transition
    pub const WARNING: &'static str = "⚠";

    /// Stopped or failed
    pub const ERROR: &'static str = "✗";

    pub const UNKNOWN: &'static str = "?";

    pub fn for_state(state: ContainerState) -> &'static str {
        match state {
            ContainerState::Running => Self::SUCCESS,
            ContainerState::Paused | ContainerState::Starting | ContainerState::Stopping => {
                Self::WARNING
            }
            ContainerState::Stopped | ContainerState::Error => Self::ERROR,
            ContainerState::None => Self::UNKNOWN,
        }
    }

    pub fn state_text(state: ContainerState) -> String {
        match state {
            ContainerState::None => "Unknown".to_string(),
            other => other.to_string(),
        }
    }
}
