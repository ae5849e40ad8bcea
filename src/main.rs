use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use supabase_policy_fix::{rewrite, RewriteOptions};

#[derive(Parser, Debug)]
#[clap(name = "supabase-policy-fix", version)]
#[clap(about = "Adds DROP POLICY IF EXISTS before each CREATE POLICY in a Supabase migration", long_about = None)]
struct Cli {
    /// Migration file to fix. Defaults to the standard RLS policies migration.
    #[clap(long)]
    source: Option<PathBuf>,

    /// Where to write the fixed migration. Defaults to the standard "_fixed" location.
    #[clap(long)]
    destination: Option<PathBuf>,

    /// Output debug logs to stderr
    #[clap(long)]
    debug: bool,
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init_from_env(Env::default().default_filter_or("warn"));
    }

    let mut options = RewriteOptions::default();
    if let Some(source) = cli.source {
        options = options.with_source_path(source);
    }
    if let Some(destination) = cli.destination {
        options = options.with_destination_path(destination);
    }

    let summary = rewrite(&options)?;

    println!("✓ Fixed file written to: {}", summary.destination_path.display());
    println!("  Added DROP POLICY IF EXISTS statements before CREATE POLICY");
    println!("  Total lines: {}", summary.lines_written);

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
