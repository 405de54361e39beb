//! Display-row model for the stack graph.

/// One displayed branch, in top-to-bottom display order.
///
/// The row sequence models the stack with the newest branches first and the
/// trunk last: a row's parent, if present, appears later in the sequence.
/// Lane assignment is supplied by the caller (see [`crate::stack`]); lane 0
/// is reserved for the trunk chain by convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRow {
    /// Branch name, unique within one layout call.
    pub name: String,
    /// Name of the parent branch, if any. A row with no parent is a root.
    pub parent_name: Option<String>,
    /// Column index for side-by-side rendering.
    pub lane: usize,
    /// This branch is currently checked out.
    pub is_current: bool,
    /// Synthetic entry representing uncommitted changes on top of the
    /// current branch.
    pub is_uncommitted: bool,
    /// The edge to this row's parent is stale and needs a restack.
    pub needs_restack: bool,
}

impl BranchRow {
    /// Create a row with all flags cleared.
    pub fn new(name: impl Into<String>, parent_name: Option<&str>, lane: usize) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.map(String::from),
            lane,
            is_current: false,
            is_uncommitted: false,
            needs_restack: false,
        }
    }
}

/// Visual styling for a row's node glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeStyle {
    /// The checked-out branch.
    Current,
    /// The synthetic uncommitted-changes entry.
    Uncommitted,
    #[default]
    Normal,
}

impl NodeStyle {
    /// Derive the style from a row's flags. `is_current` wins if both flags
    /// were ever set, though the two are not expected to co-occur.
    pub fn of(row: &BranchRow) -> Self {
        if row.is_current {
            NodeStyle::Current
        } else if row.is_uncommitted {
            NodeStyle::Uncommitted
        } else {
            NodeStyle::Normal
        }
    }

    /// Get the string representation of this style
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStyle::Current => "current",
            NodeStyle::Uncommitted => "uncommitted",
            NodeStyle::Normal => "normal",
        }
    }
}

impl std::fmt::Display for NodeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
