//! Single-pass rewrite of a migration file
//!
//! Reads the whole migration into memory, walks its lines once, and writes
//! the transformed document in a single operation so a failed run never
//! leaves a partially written destination behind.

use log::debug;
use std::fs;
use std::path::PathBuf;

use crate::config::RewriteOptions;
use crate::error::Error;
use crate::rls;

/// The transformed migration, still in memory
#[derive(Debug)]
pub struct RewrittenDocument {
    /// Output lines, each keeping its own trailing newline (if any)
    pub lines: Vec<String>,
    /// Number of policies that received a removal statement
    pub policies_fixed: usize,
}

impl RewrittenDocument {
    /// The full output document as one string
    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

/// Outcome of a completed rewrite
#[derive(Debug)]
pub struct RewriteSummary {
    /// Where the rewritten migration was written
    pub destination_path: PathBuf,
    /// Total number of lines written, insertions included
    pub lines_written: usize,
    /// Number of policies that received a removal statement
    pub policies_fixed: usize,
}

/// Rewrite the migration text so that every recognized `CREATE POLICY`
/// statement is preceded by a matching `DROP POLICY IF EXISTS` line.
///
/// Every input line is copied to the output byte for byte and in order;
/// the only change is the inserted removal line directly before each
/// resolved policy definition. The lookahead used to resolve a policy's
/// table only peeks at later lines, it never skips them.
pub fn rewrite_document(input: &str) -> RewrittenDocument {
    let lines: Vec<&str> = input.split_inclusive('\n').collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut policies_fixed = 0;

    for (index, line) in lines.iter().enumerate() {
        if let Some(target) = rls::scan_policy_at(&lines, index) {
            debug!(
                "line {}: inserting removal for policy \"{}\" on {}",
                index + 1,
                target.name,
                target.table
            );
            output.push(format!("{}\n", target.drop_policy_sql()));
            policies_fixed += 1;
        }
        output.push((*line).to_string());
    }

    RewrittenDocument {
        lines: output,
        policies_fixed,
    }
}

/// Rewrite the migration at `options.source_path` into
/// `options.destination_path`, overwriting any existing destination.
///
/// The source is read in full before any output is produced and the
/// destination is written in one operation; on error the destination is
/// either fully written or untouched.
pub fn rewrite(options: &RewriteOptions) -> Result<RewriteSummary, Error> {
    let input = fs::read_to_string(&options.source_path).map_err(|source| Error::SourceRead {
        path: options.source_path.clone(),
        source,
    })?;

    let document = rewrite_document(&input);

    fs::write(&options.destination_path, document.text()).map_err(|source| {
        Error::DestinationWrite {
            path: options.destination_path.clone(),
            source,
        }
    })?;

    Ok(RewriteSummary {
        destination_path: options.destination_path.clone(),
        lines_written: document.lines.len(),
        policies_fixed: document.policies_fixed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_policy_gets_a_removal_statement() {
        let input = "CREATE POLICY \"select_own\" ON public.users FOR SELECT USING (auth.uid() = id);\n";
        let document = rewrite_document(input);

        assert_eq!(document.policies_fixed, 1);
        assert_eq!(
            document.lines,
            vec![
                "DROP POLICY IF EXISTS \"select_own\" ON public.users;\n".to_string(),
                input.to_string(),
            ]
        );
    }

    #[test]
    fn split_policy_resolves_table_from_a_later_line() {
        let input = "CREATE POLICY \"insert_own\"\n  FOR INSERT\n  ON public.orders\n  WITH CHECK (auth.uid() = user_id);\n";
        let document = rewrite_document(input);

        assert_eq!(document.policies_fixed, 1);
        assert_eq!(
            document.lines[0],
            "DROP POLICY IF EXISTS \"insert_own\" ON public.orders;\n"
        );
        // The peeked-at lines stay where they were, untouched.
        assert_eq!(document.lines[1], "CREATE POLICY \"insert_own\"\n");
        assert_eq!(document.lines[3], "  ON public.orders\n");
    }

    #[test]
    fn policy_without_in_window_table_passes_through() {
        let input = "CREATE POLICY \"broken\"\n\n\n\n\n  ON public.orders\n";
        let document = rewrite_document(input);

        assert_eq!(document.policies_fixed, 0);
        assert_eq!(document.text(), input);
    }

    #[test]
    fn input_without_policies_is_unchanged() {
        let input = "-- migration header\nALTER TABLE public.users ENABLE ROW LEVEL SECURITY;\n\nGRANT SELECT ON public.users TO authenticated;\n";
        let document = rewrite_document(input);

        assert_eq!(document.policies_fixed, 0);
        assert_eq!(document.text(), input);
    }

    #[test]
    fn line_count_grows_by_one_per_resolved_policy() {
        let input = "\
-- policies
CREATE POLICY \"select_own\" ON public.users FOR SELECT USING (auth.uid() = id);

CREATE POLICY \"insert_own\"
  ON public.orders
  FOR INSERT WITH CHECK (auth.uid() = user_id);

CREATE POLICY \"broken\" FOR SELECT USING (true);
";
        let input_lines = input.split_inclusive('\n').count();
        let document = rewrite_document(input);

        assert_eq!(document.policies_fixed, 2);
        assert_eq!(document.lines.len(), input_lines + 2);
    }

    #[test]
    fn removal_lands_directly_before_each_policy() {
        let input = "\
CREATE POLICY \"a\" ON public.users FOR SELECT USING (true);
CREATE POLICY \"b\" ON public.orders FOR SELECT USING (true);
";
        let document = rewrite_document(input);

        assert_eq!(
            document.lines,
            vec![
                "DROP POLICY IF EXISTS \"a\" ON public.users;\n".to_string(),
                "CREATE POLICY \"a\" ON public.users FOR SELECT USING (true);\n".to_string(),
                "DROP POLICY IF EXISTS \"b\" ON public.orders;\n".to_string(),
                "CREATE POLICY \"b\" ON public.orders FOR SELECT USING (true);\n".to_string(),
            ]
        );
    }

    #[test]
    fn missing_trailing_newline_is_preserved() {
        let input = "CREATE POLICY \"select_own\" ON public.users FOR SELECT USING (true);";
        let document = rewrite_document(input);

        assert_eq!(document.policies_fixed, 1);
        assert_eq!(
            document.text(),
            "DROP POLICY IF EXISTS \"select_own\" ON public.users;\nCREATE POLICY \"select_own\" ON public.users FOR SELECT USING (true);"
        );
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let document = rewrite_document("");
        assert_eq!(document.policies_fixed, 0);
        assert!(document.lines.is_empty());
        assert_eq!(document.text(), "");
    }
}
