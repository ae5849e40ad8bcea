//! Recognition of `CREATE POLICY` statements and synthesis of their
//! `DROP POLICY IF EXISTS` counterparts
//!
//! The scan is pattern based, not a SQL grammar: a policy definition is a
//! line whose trimmed text starts with `CREATE POLICY`, carrying a quoted
//! policy name, with the target table referenced as `ON public.<table>`
//! either on the same line or within the next few lines.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Number of lines inspected when resolving a policy's target table: the
/// `CREATE POLICY` line itself plus up to four following lines.
const TABLE_LOOKAHEAD: usize = 5;

static POLICY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"CREATE POLICY "([^"]+)""#).unwrap());

static POLICY_TABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ON (public\.\w+)").unwrap());

/// A policy name paired with the table it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTarget {
    /// The quoted policy name as written in the migration
    pub name: String,
    /// The qualified table reference, e.g. `public.users`
    pub table: String,
}

impl PolicyTarget {
    /// Generates the `DROP POLICY` statement that makes re-creating this
    /// policy idempotent.
    pub fn drop_policy_sql(&self) -> String {
        format!("DROP POLICY IF EXISTS \"{}\" ON {};", self.name, self.table)
    }
}

/// Returns true if the line, ignoring surrounding whitespace, starts a
/// `CREATE POLICY` statement. Prefix test only, no grammar check.
pub fn is_policy_definition(line: &str) -> bool {
    line.trim().starts_with("CREATE POLICY")
}

/// Extract the quoted policy name from a `CREATE POLICY` line.
///
/// The name is everything between the double quotes, so embedded spaces
/// and punctuation survive. Returns `None` if the line has no quoted name.
pub fn extract_policy_name(line: &str) -> Option<&str> {
    POLICY_NAME
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Find the `ON public.<table>` reference for the policy defined at
/// `start`, peeking at most [`TABLE_LOOKAHEAD`] lines without advancing
/// the caller's position. The first match wins, scanning top to bottom.
pub fn find_table_reference(lines: &[&str], start: usize) -> Option<String> {
    let end = (start + TABLE_LOOKAHEAD).min(lines.len());
    lines[start..end]
        .iter()
        .find_map(|line| POLICY_TABLE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolve the policy defined at `index`, if the line is a policy
/// definition with a recoverable name and an in-window table reference.
pub fn scan_policy_at(lines: &[&str], index: usize) -> Option<PolicyTarget> {
    let line = lines.get(index)?;
    if !is_policy_definition(line) {
        return None;
    }

    let Some(name) = extract_policy_name(line) else {
        debug!("line {}: CREATE POLICY without a quoted name, skipping", index + 1);
        return None;
    };

    let Some(table) = find_table_reference(lines, index) else {
        debug!(
            "line {}: no ON public.<table> within {} lines of policy \"{}\", skipping",
            index + 1,
            TABLE_LOOKAHEAD,
            name
        );
        return None;
    };

    Some(PolicyTarget {
        name: name.to_string(),
        table,
    })
}
