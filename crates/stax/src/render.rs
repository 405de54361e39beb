//! Terminal rendering of the stack graph.
//!
//! Each lane is two character columns wide: the lane column itself plus a
//! gap the fork connectors run through. Node glyphs: `◉` current, `◌`
//! uncommitted, `○` normal. Stale (needs-restack) segments render yellow so
//! the whole child-to-parent line reads as one out-of-date relationship.

use owo_colors::OwoColorize;
use stax_api::{GraphData, GraphRow};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// How a rendered span should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tint {
    Plain,
    Stale,
    Current,
    Wip,
}

fn paint(text: &str, tint: Tint, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tint {
        Tint::Plain => text.to_string(),
        Tint::Stale => text.yellow().to_string(),
        Tint::Current => text.cyan().bold().to_string(),
        Tint::Wip => text.dimmed().to_string(),
    }
}

/// Render the whole graph, one line per row, trailing newline included.
pub fn render_graph(graph: &GraphData, color: bool) -> String {
    let mut output = String::new();
    for row in &graph.rows {
        output.push_str(&render_row(row, color));
        output.push('\n');
    }
    output
}

fn node_glyph(row: &GraphRow) -> (char, Tint) {
    match row.node_style.as_str() {
        "current" => ('◉', Tint::Current),
        "uncommitted" => ('◌', Tint::Wip),
        _ if row.node_needs_restack => ('○', Tint::Stale),
        _ => ('○', Tint::Plain),
    }
}

fn render_row(row: &GraphRow, color: bool) -> String {
    let width = row.lanes.len() * 2;
    let mut cells: Vec<(char, Tint)> = vec![(' ', Tint::Plain); width];

    // Vertical connectors and the node glyph.
    for (lane, cell) in row.lanes.iter().enumerate() {
        let col = lane * 2;
        if cell.has_node {
            cells[col] = node_glyph(row);
        } else if cell.continues_from_above || cell.continues_below {
            let tint = if cell.needs_restack {
                Tint::Stale
            } else {
                Tint::Plain
            };
            cells[col] = ('│', tint);
        }
    }

    // Fork connectors bending into this row's node. Ascending lane order, so
    // a nearer fork's bend becomes a junction when a farther one crosses it.
    for fork in &row.child_fork_lanes {
        let tint = if fork.needs_restack {
            Tint::Stale
        } else if fork.is_uncommitted {
            Tint::Wip
        } else {
            Tint::Plain
        };

        let (lo, hi) = if fork.lane > row.node_lane {
            (row.node_lane, fork.lane)
        } else {
            (fork.lane, row.node_lane)
        };
        for col in (lo * 2 + 1)..(hi * 2) {
            cells[col] = match cells[col].0 {
                '│' => ('┼', tint),
                '╯' | '╰' | '┴' => ('┴', tint),
                _ => ('─', tint),
            };
        }

        let bend = if fork.lane > row.node_lane { '╯' } else { '╰' };
        cells[fork.lane * 2] = (bend, tint);
    }

    let mut line = String::new();
    for (ch, tint) in cells {
        let mut buf = [0u8; 4];
        line.push_str(&paint(ch.encode_utf8(&mut buf), tint, color));
    }

    // Branch name and annotations after the glyph columns.
    let name_tint = match row.node_style.as_str() {
        "current" => Tint::Current,
        "uncommitted" => Tint::Wip,
        _ => Tint::Plain,
    };
    line.push_str(&paint(&row.name, name_tint, color));

    if row.node_needs_restack {
        line.push_str(&paint(" (needs restack)", Tint::Stale, color));
    }

    if let Some(pr) = &row.pr {
        let label = match &pr.title {
            Some(title) => format!("  #{} {}", pr.number, title),
            None => format!("  #{}", pr.number),
        };
        line.push_str(&paint(&label, Tint::Wip, color));
    }

    line
}
