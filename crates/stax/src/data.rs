//! Building graph snapshots from the stacking tool's output.
//!
//! This is the glue between the tool invocation, the core row/layout
//! pipeline, and the wire types the renderer and panel consume.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eyre::Result;
use stax_api::{ApiPrInfo, GraphData, GraphRow};
use stax_core::{build_rows, build_tree_fragments, parse_stack_output};
use tracing::debug;

use crate::config::Config;
use crate::tool;

/// Walk up from `start` looking for a `.git` entry.
pub fn discover_repo_root(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(".git").exists() {
            return Ok(current);
        }

        if !current.pop() {
            eyre::bail!("No git repository found at or above {}", start.display());
        }
    }
}

/// Run the stacking tool and lay out the graph it reports.
pub fn load_graph(repo_root: &Path, config: &Config) -> Result<GraphData> {
    let output = tool::run_stack_tool(&config.tool, repo_root)?;
    Ok(graph_from_output(&output, config.trunk.as_deref()))
}

/// Parse tool output and lay out the graph. Total: malformed lines are
/// logged and skipped, so whatever parsed still renders.
pub fn graph_from_output(output: &str, trunk: Option<&str>) -> GraphData {
    let parse = parse_stack_output(output);
    for warning in &parse.warnings {
        debug!(
            "Skipping unparsable tool output line {}: {}",
            warning.line, warning.message
        );
    }

    let rows = build_rows(&parse.records, trunk);
    let fragments = build_tree_fragments(&rows);

    let prs: HashMap<&str, ApiPrInfo> = parse
        .records
        .iter()
        .filter_map(|record| {
            record.pr.as_ref().map(|pr| {
                (
                    record.name.as_str(),
                    ApiPrInfo {
                        number: pr.number,
                        title: pr.title.clone(),
                        url: pr.url.clone(),
                    },
                )
            })
        })
        .collect();

    let max_lane = rows
        .first()
        .and_then(|row| fragments.get(&row.name))
        .map(|fragment| fragment.max_lane)
        .unwrap_or(0);

    let graph_rows = rows
        .iter()
        .filter_map(|row| fragments.get(&row.name).map(|f| (row, f)))
        .map(|(row, fragment)| {
            let mut graph_row = GraphRow::from_fragment(&row.name, fragment);
            graph_row.pr = prs.get(row.name.as_str()).cloned();
            graph_row
        })
        .collect();

    GraphData {
        max_lane,
        rows: graph_rows,
    }
}
