//! Stack tree layout engine.
//!
//! Maps an ordered list of display rows into per-row rendering fragments
//! describing, lane by lane, whether a connector line enters the row from
//! above, exits below, carries a node glyph, and whether the segment belongs
//! to a stale (needs-restack) relationship, plus the fork points where a
//! parent's line bends into a child's lane.
//!
//! The engine only draws what it is given: it does not assign lanes, fetch
//! branch data, or validate that the caller's lane numbering makes sense.
//! It is a pure function over the row sequence, so repeated calls with the
//! same input produce the same output and calls may run concurrently.

use std::collections::HashMap;

use crate::row::{BranchRow, NodeStyle};

/// Rendering state of a single lane column within one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneCell {
    /// A connector line crosses the top edge of this cell.
    pub continues_from_above: bool,
    /// A connector line crosses the bottom edge of this cell.
    pub continues_below: bool,
    /// This row's own node sits in this lane.
    pub has_node: bool,
    /// The segment drawn here is part of a child-to-parent connection whose
    /// child needs a restack.
    pub needs_restack: bool,
}

/// A fork connector a parent row draws toward a direct child that lives on a
/// different lane. Flags are copied from the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkPoint {
    pub lane: usize,
    pub needs_restack: bool,
    pub is_uncommitted: bool,
}

/// Per-row rendering fragment: everything a renderer needs to draw one row
/// of the multi-lane ancestry graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFragment {
    /// The row's own lane.
    pub node_lane: usize,
    /// Reserved for a direct-connection lane value. Lane transitions are
    /// recorded on the parent side via `child_fork_lanes`, so this is never
    /// populated; kept for wire compatibility with existing consumers.
    pub parent_lane: Option<usize>,
    /// Highest lane index used anywhere in the input, repeated on every
    /// fragment so a renderer can size its column grid.
    pub max_lane: usize,
    /// One cell per lane column, exactly `max_lane + 1` entries.
    pub lanes: Vec<LaneCell>,
    /// Fork connectors toward children on other lanes, ascending by lane.
    pub child_fork_lanes: Vec<ForkPoint>,
    /// Styling for the node glyph.
    pub node_style: NodeStyle,
    /// The row's own needs-restack flag, exposed for convenience.
    pub node_needs_restack: bool,
}

/// Compute a rendering fragment for every row, keyed by branch name.
///
/// Rows are given top-to-bottom with the newest branches first and the trunk
/// last; a row's parent appears on a later row. The function is total over
/// any input: a parent reference that does not resolve, resolves to the row
/// itself, or points at an earlier row leaves the row rootless instead of
/// failing. Names are expected to be unique; if they are not, the last row
/// with a given name wins.
pub fn build_tree_fragments(rows: &[BranchRow]) -> HashMap<String, TreeFragment> {
    if rows.is_empty() {
        return HashMap::new();
    }

    let parents = resolve_parents(rows);
    let max_lane = rows.iter().map(|r| r.lane).max().unwrap_or(0);

    let mut cells = vec![vec![LaneCell::default(); max_lane + 1]; rows.len()];
    let mut forks: Vec<Vec<ForkPoint>> = vec![Vec::new(); rows.len()];

    // Trunk interval: lane 0 stays open from the very first row of the input
    // down to the ultimate lane-0 root, including rows whose own node sits on
    // another lane. It opens as not-continuing at the top and closes at the
    // root's row.
    if let Some(root) = trunk_root(rows) {
        for (i, row_cells) in cells.iter_mut().enumerate().take(root + 1) {
            let cell = &mut row_cells[0];
            cell.continues_from_above = i > 0;
            cell.continues_below = i < root;
        }
    }

    // Every resolved child-to-parent edge opens a lane interval. Intervals
    // are marked independently per edge, so the same numeric lane can open
    // and close many times for unrelated subtrees.
    for (child, parent) in parents.iter().enumerate() {
        let Some(parent) = *parent else { continue };
        let lane = rows[child].lane;
        let restack = rows[child].needs_restack;

        let cell = &mut cells[child][lane];
        cell.continues_below = true;
        cell.needs_restack |= restack;

        // Rows the connector crosses on its way down keep the lane open.
        for row_cells in &mut cells[child + 1..parent] {
            let cell = &mut row_cells[lane];
            cell.continues_from_above = true;
            cell.continues_below = true;
            cell.needs_restack |= restack;
        }

        if rows[parent].lane == lane {
            // Same-lane parent: the line runs straight into its cell.
            let cell = &mut cells[parent][lane];
            cell.continues_from_above = true;
            cell.needs_restack |= restack;
        } else {
            // Different-lane parent: the lane ends just above the parent's
            // row and the parent draws a fork toward it instead.
            forks[parent].push(ForkPoint {
                lane,
                needs_restack: restack,
                is_uncommitted: rows[child].is_uncommitted,
            });
        }
    }

    let mut fragments = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut lanes = std::mem::take(&mut cells[i]);
        lanes[row.lane].has_node = true;

        let mut child_fork_lanes = std::mem::take(&mut forks[i]);
        child_fork_lanes.sort_by_key(|f| f.lane);

        fragments.insert(
            row.name.clone(),
            TreeFragment {
                node_lane: row.lane,
                parent_lane: None,
                max_lane,
                lanes,
                child_fork_lanes,
                node_style: NodeStyle::of(row),
                node_needs_restack: row.needs_restack,
            },
        );
    }

    fragments
}

/// Resolve each row's parent reference to a row index.
///
/// References that do not resolve, resolve to the row itself, or point at an
/// earlier row (violating the trunk-last ordering) are dropped; the row is
/// then treated as rootless.
fn resolve_parents(rows: &[BranchRow]) -> Vec<Option<usize>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        index.insert(row.name.as_str(), i);
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            row.parent_name
                .as_deref()
                .and_then(|name| index.get(name).copied())
                .filter(|&parent| parent > i)
        })
        .collect()
}

/// Row index of the ultimate lane-0 root: the last row in document order on
/// lane 0 that carries no parent reference at all. Rows with dangling
/// references stay rootless in their own lane but do not close the trunk
/// interval.
fn trunk_root(rows: &[BranchRow]) -> Option<usize> {
    rows.iter()
        .rposition(|row| row.lane == 0 && row.parent_name.is_none())
}
