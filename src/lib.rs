//! Idempotent RLS policy rewriting for Supabase migrations
//!
//! Rewrites a migration file so that every `CREATE POLICY` statement is
//! preceded by a matching `DROP POLICY IF EXISTS` statement, letting the
//! migration be re-applied without manual cleanup. The rewrite is a single
//! forward pass over the lines of the file; anything that is not a
//! recognized policy definition is copied through untouched.

pub mod config;
pub mod error;
pub mod rewrite;
pub mod rls;

pub use config::RewriteOptions;
pub use error::Error;
pub use rewrite::{rewrite, rewrite_document, RewriteSummary, RewrittenDocument};
pub use rls::PolicyTarget;
