//! Color theme for CLI output

use crate::infrastructure::oci::ContainerState;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    pub fn state_color(&self, state: ContainerState) -> TableColor {
        match state {
            ContainerState::Running => self.success,
            ContainerState::Paused | ContainerState::Starting | ContainerState::Stopping => {
                self.warning
            }
            ContainerState::Stopped | ContainerState::Error => self.error,
            ContainerState::None => self.muted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_state_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.state_color(ContainerState::Running), TableColor::Green);
        assert_eq!(theme.state_color(ContainerState::Paused), TableColor::Yellow);
        assert_eq!(theme.state_color(ContainerState::Error), TableColor::Red);
        assert_eq!(theme.state_color(ContainerState::None), TableColor::DarkGrey);
    }
}
