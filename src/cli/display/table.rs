//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::infrastructure::oci::ContainerState;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Node information for status display
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub name: String,
    pub state: ContainerState,
    /// Only known for running nodes
    pub addresses: Option<(String, String)>,
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    pub fn render_nodes(&self, nodes: &[NodeInfo]) -> String {
        if nodes.is_empty() {
            return "No nodes found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("NODE").set_alignment(CellAlignment::Left),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
                Cell::new("IPV4").set_alignment(CellAlignment::Left),
                Cell::new("IPV6").set_alignment(CellAlignment::Left),
            ]);

        for node in nodes {
            let (ipv4, ipv6) = match &node.addresses {
                Some((v4, v6)) => (or_dash(v4), or_dash(v6)),
                None => ("-".to_string(), "-".to_string()),
            };
            table.add_row(vec![
                Cell::new(&node.name),
                Cell::new(format!(
                    "{} {}",
                    StatusIcon::for_state(node.state),
                    StatusIcon::state_text(node.state)
                ))
                .fg(self.theme.state_color(node.state)),
                Cell::new(ipv4),
                Cell::new(ipv6),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Running  {} Paused  {} Stopped\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::WARNING.yellow(),
            StatusIcon::ERROR.red()
        ));
        output
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_nodes() {
        let renderer = TableRenderer::new();
        assert!(renderer.render_nodes(&[]).contains("No nodes found"));
    }

    #[test]
    fn test_render_running_node() {
        let renderer = TableRenderer::new();
        let output = renderer.render_nodes(&[NodeInfo {
            name: "kic-control-plane".to_string(),
            state: ContainerState::Running,
            addresses: Some(("172.17.0.2".to_string(), String::new())),
        }]);
        assert!(output.contains("kic-control-plane"));
        assert!(output.contains("Running"));
        assert!(output.contains("172.17.0.2"));
    }

    #[test]
    fn test_render_stopped_node_without_addresses() {
        let renderer = TableRenderer::new();
        let output = renderer.render_nodes(&[NodeInfo {
            name: "n1".to_string(),
            state: ContainerState::Stopped,
            addresses: None,
        }]);
        assert!(output.contains("Stopped"));
        assert!(output.contains(StatusIcon::ERROR));
    }
}
