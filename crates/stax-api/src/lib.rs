//! API types for the stax panel
//!
//! This crate contains only the JSON type definitions shared by the stax
//! panel server, the `--format json` CLI output, and the in-browser panel.
//! Everything serializes in camelCase to match what the panel's JavaScript
//! expects.

use serde::{Deserialize, Serialize};
use stax_core::{ForkPoint, LaneCell, TreeFragment};

/// The whole graph, rows in top-to-bottom display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    /// Highest lane index used anywhere in the graph.
    pub max_lane: usize,
    pub rows: Vec<GraphRow>,
}

/// One rendered row: a branch plus its connector fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRow {
    pub name: String,
    pub node_lane: usize,
    /// Reserved direct-connection lane; never populated, kept for
    /// compatibility with existing panel consumers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_lane: Option<usize>,
    /// `current`, `uncommitted`, or `normal`.
    pub node_style: String,
    pub node_needs_restack: bool,
    /// One cell per lane column.
    pub lanes: Vec<ApiLaneCell>,
    /// Fork connectors toward children on other lanes, ascending by lane.
    pub child_fork_lanes: Vec<ApiForkPoint>,
    /// Associated pull request, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr: Option<ApiPrInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLaneCell {
    pub continues_from_above: bool,
    pub continues_below: bool,
    pub has_node: bool,
    pub needs_restack: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiForkPoint {
    pub lane: usize,
    pub needs_restack: bool,
    pub is_uncommitted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrInfo {
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Repository and tool info shown in the panel header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfigInfo {
    pub repo_root: String,
    pub tool_command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trunk: Option<String>,
}

/// Snapshot counter used by the panel for live-reload polling. Bumps only
/// when the graph content actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersion {
    pub version: u64,
}

/// Watcher health for `/api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    pub watcher_active: bool,
    pub event_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<LaneCell> for ApiLaneCell {
    fn from(cell: LaneCell) -> Self {
        Self {
            continues_from_above: cell.continues_from_above,
            continues_below: cell.continues_below,
            has_node: cell.has_node,
            needs_restack: cell.needs_restack,
        }
    }
}

impl From<ForkPoint> for ApiForkPoint {
    fn from(fork: ForkPoint) -> Self {
        Self {
            lane: fork.lane,
            needs_restack: fork.needs_restack,
            is_uncommitted: fork.is_uncommitted,
        }
    }
}

impl GraphRow {
    /// Build a wire row from a branch name and its layout fragment.
    pub fn from_fragment(name: &str, fragment: &TreeFragment) -> Self {
        Self {
            name: name.to_string(),
            node_lane: fragment.node_lane,
            parent_lane: fragment.parent_lane,
            node_style: fragment.node_style.as_str().to_string(),
            node_needs_restack: fragment.node_needs_restack,
            lanes: fragment.lanes.iter().copied().map(Into::into).collect(),
            child_fork_lanes: fragment
                .child_fork_lanes
                .iter()
                .copied()
                .map(Into::into)
                .collect(),
            pr: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stax_core::{BranchRow, build_tree_fragments};

    #[test]
    fn test_graph_row_serializes_camel_case() {
        let rows = vec![
            BranchRow::new("feature", Some("main"), 1),
            BranchRow::new("main", None, 0),
        ];
        let fragments = build_tree_fragments(&rows);
        let row = GraphRow::from_fragment("main", &fragments["main"]);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["nodeLane"], 0);
        assert_eq!(json["nodeStyle"], "normal");
        assert_eq!(json["childForkLanes"][0]["lane"], 1);
        assert_eq!(json["lanes"][0]["continuesFromAbove"], true);
        // Reserved field stays off the wire while unset.
        assert!(json.get("parentLane").is_none());
    }

    #[test]
    fn test_version_round_trip() {
        let v = ApiVersion { version: 7 };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(serde_json::from_str::<ApiVersion>(&json).unwrap(), v);
    }
}
