//! Reduces branch records into display rows with lane assignment.
//!
//! The layout engine consumes rows top-to-bottom with the trunk last; this
//! module owns that ordering plus the lane numbering scheme. The first child
//! of a branch continues its parent's lane, every other child forks onto the
//! lowest free lane, and freed lanes are handed back once the parent has been
//! emitted so later unrelated subtrees can reuse the same number.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::branch::BranchRecord;
use crate::row::BranchRow;

/// Name given to the synthetic row representing uncommitted changes sitting
/// on top of the current branch.
pub const UNCOMMITTED_ROW_NAME: &str = "(uncommitted changes)";

/// Build display rows from branch records.
///
/// The trunk is `trunk` if that name is present among the records, otherwise
/// the first record without a down link. Branches unreachable from the trunk
/// are appended after its subtree; their subtrees start on fresh lanes and
/// their rows keep whatever parent reference they carried, so the layout
/// engine renders them as disconnected roots.
pub fn build_rows(records: &[BranchRecord], trunk: Option<&str>) -> Vec<BranchRow> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut builder = RowBuilder::new(records);
    let trunk_idx = builder.pick_trunk(trunk);
    builder.emit(trunk_idx, 0);

    // Anything not reachable from the trunk: emit remaining local roots
    // first, then whatever is left (cycles), each on its own fresh lane.
    for idx in 0..records.len() {
        if !builder.visited[idx] && builder.parent_of(idx).is_none() {
            let lane = builder.pool.acquire();
            builder.emit(idx, lane);
            builder.pool.release(lane);
        }
    }
    for idx in 0..records.len() {
        if !builder.visited[idx] {
            let lane = builder.pool.acquire();
            builder.emit(idx, lane);
            builder.pool.release(lane);
        }
    }

    builder.rows
}

/// Allocates fork lanes, always preferring the lowest free number.
struct LanePool {
    free: BinaryHeap<Reverse<usize>>,
    next: usize,
}

impl LanePool {
    fn new() -> Self {
        Self {
            free: BinaryHeap::new(),
            next: 1,
        }
    }

    fn acquire(&mut self) -> usize {
        if let Some(Reverse(lane)) = self.free.pop() {
            lane
        } else {
            let lane = self.next;
            self.next += 1;
            lane
        }
    }

    fn release(&mut self, lane: usize) {
        self.free.push(Reverse(lane));
    }
}

struct RowBuilder<'a> {
    records: &'a [BranchRecord],
    /// Record index by branch name.
    index: HashMap<&'a str, usize>,
    /// Child record indices per parent, in record order.
    children: Vec<Vec<usize>>,
    visited: Vec<bool>,
    pool: LanePool,
    rows: Vec<BranchRow>,
}

impl<'a> RowBuilder<'a> {
    fn new(records: &'a [BranchRecord]) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            index.entry(record.name.as_str()).or_insert(i);
        }

        let mut children = vec![Vec::new(); records.len()];
        for (i, record) in records.iter().enumerate() {
            if let Some(down) = &record.down
                && let Some(&parent) = index.get(down.name.as_str())
                && parent != i
            {
                children[parent].push(i);
            }
        }

        Self {
            visited: vec![false; records.len()],
            pool: LanePool::new(),
            rows: Vec::with_capacity(records.len()),
            records,
            index,
            children,
        }
    }

    fn pick_trunk(&self, preferred: Option<&str>) -> usize {
        if let Some(name) = preferred
            && let Some(&idx) = self.index.get(name)
        {
            return idx;
        }
        self.records
            .iter()
            .position(|r| r.down.is_none())
            .unwrap_or(0)
    }

    /// Resolved parent record index, if the down link names a known branch.
    fn parent_of(&self, idx: usize) -> Option<usize> {
        let down = self.records[idx].down.as_ref()?;
        self.index
            .get(down.name.as_str())
            .copied()
            .filter(|&p| p != idx)
    }

    /// Emit the subtree rooted at `idx`: all descendants first (forked lanes
    /// above the same-lane continuation), then the branch itself.
    fn emit(&mut self, idx: usize, lane: usize) {
        if self.visited[idx] {
            return;
        }
        self.visited[idx] = true;

        let kids = self.children[idx].clone();
        let mut assigned: Vec<(usize, usize)> = Vec::with_capacity(kids.len());
        for (i, &kid) in kids.iter().enumerate() {
            let kid_lane = if i == 0 { lane } else { self.pool.acquire() };
            assigned.push((kid, kid_lane));
        }

        // Higher lanes render above the straight continuation.
        let mut by_lane = assigned.clone();
        by_lane.sort_by_key(|&(_, l)| Reverse(l));
        for (kid, kid_lane) in by_lane {
            self.emit(kid, kid_lane);
        }

        for (_, kid_lane) in assigned {
            if kid_lane != lane {
                self.pool.release(kid_lane);
            }
        }

        let record = &self.records[idx];
        if record.is_current && record.has_uncommitted_changes {
            let mut wip = BranchRow::new(UNCOMMITTED_ROW_NAME, Some(&record.name), lane);
            wip.is_uncommitted = true;
            self.rows.push(wip);
        }

        let mut row = BranchRow::new(
            &record.name,
            record.down.as_ref().map(|d| d.name.as_str()),
            lane,
        );
        row.is_current = record.is_current;
        row.needs_restack = record.down.as_ref().is_some_and(|d| d.needs_restack);
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::parse_stack_output;

    fn records(ndjson: &str) -> Vec<BranchRecord> {
        let parse = parse_stack_output(ndjson);
        assert!(parse.warnings.is_empty(), "{:?}", parse.warnings);
        parse.records
    }

    fn names(rows: &[BranchRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_records() {
        assert!(build_rows(&[], None).is_empty());
    }

    #[test]
    fn test_linear_chain_trunk_last_on_lane_zero() {
        let recs = records(concat!(
            r#"{"name":"main","ups":["a"]}"#,
            "\n",
            r#"{"name":"a","down":{"name":"main"},"ups":["b"]}"#,
            "\n",
            r#"{"name":"b","down":{"name":"a"}}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);

        assert_eq!(names(&rows), vec!["b", "a", "main"]);
        assert!(rows.iter().all(|r| r.lane == 0));
        assert_eq!(rows[0].parent_name.as_deref(), Some("a"));
        assert_eq!(rows[2].parent_name, None);
    }

    #[test]
    fn test_fork_gets_own_lane_above_continuation() {
        let recs = records(concat!(
            r#"{"name":"main"}"#,
            "\n",
            r#"{"name":"child","down":{"name":"main"}}"#,
            "\n",
            r#"{"name":"feature","down":{"name":"main"}}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);

        assert_eq!(names(&rows), vec!["feature", "child", "main"]);
        assert_eq!(rows[0].lane, 1);
        assert_eq!(rows[1].lane, 0);
        assert_eq!(rows[2].lane, 0);
    }

    #[test]
    fn test_restack_flag_copied_from_down_link() {
        let recs = records(concat!(
            r#"{"name":"main"}"#,
            "\n",
            r#"{"name":"a","down":{"name":"main","needsRestack":true}}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);

        assert!(rows[0].needs_restack);
        assert!(!rows[1].needs_restack);
    }

    #[test]
    fn test_synthetic_uncommitted_row_above_current() {
        let recs = records(concat!(
            r#"{"name":"main"}"#,
            "\n",
            r#"{"name":"a","down":{"name":"main"},"isCurrent":true,"hasUncommittedChanges":true}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);

        assert_eq!(names(&rows), vec![UNCOMMITTED_ROW_NAME, "a", "main"]);
        let wip = &rows[0];
        assert!(wip.is_uncommitted);
        assert_eq!(wip.parent_name.as_deref(), Some("a"));
        assert_eq!(wip.lane, rows[1].lane);
        assert!(rows[1].is_current);
    }

    #[test]
    fn test_no_synthetic_row_without_changes() {
        let recs = records(concat!(
            r#"{"name":"main"}"#,
            "\n",
            r#"{"name":"a","down":{"name":"main"},"isCurrent":true}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);
        assert_eq!(names(&rows), vec!["a", "main"]);
    }

    #[test]
    fn test_preferred_trunk_selected_by_name() {
        let recs = records(concat!(
            r#"{"name":"master"}"#,
            "\n",
            r#"{"name":"main"}"#,
            "\n",
            r#"{"name":"a","down":{"name":"main"}}"#,
            "\n",
        ));
        let rows = build_rows(&recs, Some("main"));

        // main's subtree comes first; master trails as a disconnected root.
        assert_eq!(names(&rows), vec!["a", "main", "master"]);
    }

    #[test]
    fn test_unreachable_branches_appended() {
        let recs = records(concat!(
            r#"{"name":"main"}"#,
            "\n",
            r#"{"name":"lost","down":{"name":"ghost"}}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);

        assert_eq!(names(&rows), vec!["main", "lost"]);
        // Dangling reference preserved; the layout engine renders it as a
        // disconnected root.
        assert_eq!(rows[1].parent_name.as_deref(), Some("ghost"));
        assert!(rows[1].lane >= 1);
    }

    #[test]
    fn test_fork_lane_reused_after_release() {
        // The trunk's fork takes lane 1 and releases it once the trunk is
        // emitted; the later disconnected root picks the same number up.
        let recs = records(concat!(
            r#"{"name":"main"}"#,
            "\n",
            r#"{"name":"a","down":{"name":"main"}}"#,
            "\n",
            r#"{"name":"b","down":{"name":"main"}}"#,
            "\n",
            r#"{"name":"other"}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);

        let lane_of = |name: &str| rows.iter().find(|r| r.name == name).unwrap().lane;
        assert_eq!(lane_of("b"), 1);
        assert_eq!(lane_of("other"), 1);
    }

    #[test]
    fn test_self_referencing_down_link_terminates() {
        let recs = records(concat!(
            r#"{"name":"weird","down":{"name":"weird"}}"#,
            "\n",
        ));
        let rows = build_rows(&recs, None);
        assert_eq!(rows.len(), 1);
    }
}
