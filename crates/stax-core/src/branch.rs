//! Branch records emitted by the external stacking tool.
//!
//! The tool prints newline-delimited JSON: one object per line, one line per
//! branch. Lines that fail to parse are skipped with a warning attached to
//! the result, never a hard error, so one garbled line cannot take down the
//! whole graph.

use serde::Deserialize;

/// One branch as reported by the stacking tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    /// Branch name.
    pub name: String,
    /// This branch is currently checked out.
    #[serde(default)]
    pub is_current: bool,
    /// The parent edge: the branch this one is stacked on.
    #[serde(default)]
    pub down: Option<DownLink>,
    /// Names of branches stacked on top of this one.
    #[serde(default)]
    pub ups: Vec<String>,
    /// The working tree has uncommitted changes. Only meaningful on the
    /// current branch.
    #[serde(default)]
    pub has_uncommitted_changes: bool,
    /// Associated pull request, if any.
    #[serde(default)]
    pub pr: Option<PrInfo>,
}

/// The edge from a branch down to its parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownLink {
    /// Parent branch name.
    pub name: String,
    /// The parent has moved since this branch was last restacked.
    #[serde(default)]
    pub needs_restack: bool,
}

/// Pull request metadata attached to a branch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrInfo {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Warning raised for a line of tool output that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    /// 1-indexed line number in the tool output.
    pub line: usize,
    pub message: String,
}

/// Parsed stacking-tool output: the records that survived, plus warnings for
/// the lines that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackParse {
    pub records: Vec<BranchRecord>,
    pub warnings: Vec<ParseWarning>,
}

impl StackParse {
    /// Number of parsed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were parsed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse newline-delimited JSON branch records.
///
/// Empty lines are ignored; malformed lines become [`ParseWarning`]s and are
/// otherwise skipped. Records keep their input order.
pub fn parse_stack_output(output: &str) -> StackParse {
    let mut parse = StackParse::default();

    for (idx, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<BranchRecord>(line) {
            Ok(record) => parse.records.push(record),
            Err(err) => parse.warnings.push(ParseWarning {
                line: idx + 1,
                message: err.to_string(),
            }),
        }
    }

    parse
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_lines() {
        let output = concat!(
            r#"{"name":"feature","isCurrent":true,"down":{"name":"main","needsRestack":true}}"#,
            "\n",
            r#"{"name":"main"}"#,
            "\n",
        );
        let parse = parse_stack_output(output);

        assert_eq!(parse.len(), 2);
        assert!(parse.warnings.is_empty());

        let feature = &parse.records[0];
        assert!(feature.is_current);
        let down = feature.down.as_ref().unwrap();
        assert_eq!(down.name, "main");
        assert!(down.needs_restack);

        assert_eq!(parse.records[1].down, None);
    }

    #[test]
    fn test_malformed_lines_skipped_with_warning() {
        let output = "{\"name\":\"a\"}\nnot json at all\n{\"name\":\"b\"}\n";
        let parse = parse_stack_output(output);

        assert_eq!(parse.len(), 2);
        assert_eq!(parse.warnings.len(), 1);
        assert_eq!(parse.warnings[0].line, 2);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let parse = parse_stack_output("\n\n{\"name\":\"a\"}\n\n");
        assert_eq!(parse.len(), 1);
        assert!(parse.warnings.is_empty());
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_stack_output("").is_empty());
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let parse = parse_stack_output(r#"{"name":"a","someFutureField":{"x":1}}"#);
        assert_eq!(parse.len(), 1);
    }

    #[test]
    fn test_pr_metadata() {
        let parse = parse_stack_output(
            r#"{"name":"a","pr":{"number":42,"title":"Add widget","url":"https://example.com/42"}}"#,
        );
        let pr = parse.records[0].pr.as_ref().unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.title.as_deref(), Some("Add widget"));
    }
}
