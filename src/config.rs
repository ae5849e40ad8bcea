//! Configuration options for the policy rewriter

use std::path::PathBuf;

/// Locations of the migration to fix and of the rewritten copy
///
/// The defaults point at the standard RLS policies migration; tests and
/// the CLI override them to run the same rewrite on arbitrary file pairs.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// The migration file to read
    pub source_path: PathBuf,

    /// Where the rewritten migration is written (created or overwritten)
    pub destination_path: PathBuf,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("supabase/migrations/004_row_level_security_policies.sql"),
            destination_path: PathBuf::from(
                "supabase/migrations/004_row_level_security_policies_fixed.sql",
            ),
        }
    }
}

impl RewriteOptions {
    /// Set the migration file to read
    pub fn with_source_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.source_path = value.into();
        self
    }

    /// Set where the rewritten migration is written
    pub fn with_destination_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.destination_path = value.into();
        self
    }
}
