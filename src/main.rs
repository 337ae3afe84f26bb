use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use stubdoc::{sync_files, Diagnostic};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "stubdoc")]
#[command(about = "Synchronize docstrings from Python modules into their stubs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy docstrings from a source module into its stub
    Sync {
        /// Implementation module carrying the authoritative docstrings
        source: PathBuf,

        /// Stub file to rewrite
        target: PathBuf,

        /// Dry run - show what would change without modifying the stub
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Emit a machine-readable JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check whether a stub's docstrings are in sync (exit 1 if not)
    Check {
        /// Implementation module carrying the authoritative docstrings
        source: PathBuf,

        /// Stub file to check
        target: PathBuf,

        /// Emit a machine-readable JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Sync every *.py under a directory with its *.pyi stub
    SyncDir {
        /// Directory of implementation modules
        source_dir: PathBuf,

        /// Directory of stubs, mirroring the source layout
        stub_dir: PathBuf,

        /// Dry run - show what would change without modifying any stub
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            source,
            target,
            dry_run,
            diff,
            json,
        } => cmd_sync(&source, &target, dry_run, diff, json),

        Commands::Check {
            source,
            target,
            json,
        } => cmd_check(&source, &target, json),

        Commands::SyncDir {
            source_dir,
            stub_dir,
            dry_run,
            diff,
        } => cmd_sync_dir(&source_dir, &stub_dir, dry_run, diff),
    }
}

/// Machine-readable per-file report for --json output.
#[derive(Serialize)]
struct SyncReport<'a> {
    target: &'a Path,
    changed: bool,
    applied: bool,
    diagnostics: &'a [Diagnostic],
}

fn cmd_sync(source: &Path, target: &Path, dry_run: bool, show_diff: bool, json: bool) -> Result<()> {
    let sync = sync_files(source, target, !dry_run)?;

    if json {
        let report = SyncReport {
            target,
            changed: sync.changed(),
            applied: !dry_run && sync.changed(),
            diagnostics: &sync.diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    report_diagnostics(&sync.diagnostics);

    if sync.changed() {
        if dry_run {
            println!(
                "{} Would update {}",
                "✓".green(),
                target.display()
            );
        } else {
            println!("{} Updated {}", "✓".green(), target.display());
        }
        if show_diff {
            display_diff(target, &sync.original, &sync.updated);
        }
    } else {
        println!(
            "{} {} already in sync",
            "✓".green(),
            target.display()
        );
    }

    Ok(())
}

fn cmd_check(source: &Path, target: &Path, json: bool) -> Result<()> {
    let sync = sync_files(source, target, false)?;

    if json {
        let report = SyncReport {
            target,
            changed: sync.changed(),
            applied: false,
            diagnostics: &sync.diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report_diagnostics(&sync.diagnostics);
        if sync.changed() {
            println!("{} {} is out of sync", "✗".red(), target.display());
        } else {
            println!("{} {} is in sync", "✓".green(), target.display());
        }
    }

    if sync.changed() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_sync_dir(source_dir: &Path, stub_dir: &Path, dry_run: bool, show_diff: bool) -> Result<()> {
    let pairs = discover_stub_pairs(source_dir, stub_dir)?;

    if pairs.is_empty() {
        anyhow::bail!("No .py files found under {}", source_dir.display());
    }

    if dry_run {
        println!("{}", "[DRY RUN - no stubs will be modified]".cyan());
    }

    let mut updated = 0;
    let mut unchanged = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for (source, stub) in pairs {
        if !stub.exists() {
            println!(
                "{} {}: no stub at {}, skipping",
                "-".yellow(),
                source.display(),
                stub.display()
            );
            skipped += 1;
            continue;
        }

        match sync_files(&source, &stub, !dry_run) {
            Ok(sync) => {
                report_diagnostics(&sync.diagnostics);
                if sync.changed() {
                    let verb = if dry_run { "Would update" } else { "Updated" };
                    println!("{} {} {}", "✓".green(), verb, stub.display());
                    if show_diff {
                        display_diff(&stub, &sync.original, &sync.updated);
                    }
                    updated += 1;
                } else {
                    unchanged += 1;
                }
            }
            Err(e) => {
                println!("{} {}: {}", "✗".red(), stub.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!(
        "Summary: {} updated, {} unchanged, {} skipped, {} failed",
        updated, unchanged, skipped, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Pair every source module with its stub by relative path.
///
/// `pkg/find.py` under the source directory maps to `pkg/find.pyi` under
/// the stub directory.
fn discover_stub_pairs(source_dir: &Path, stub_dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut pairs = Vec::new();

    for entry in WalkDir::new(source_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|s| s.to_str()) != Some("py") {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .expect("walkdir entries live under their root");
        let stub = stub_dir.join(relative).with_extension("pyi");
        pairs.push((entry.path().to_path_buf(), stub));
    }

    pairs.sort();
    Ok(pairs)
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{} {}", "warning:".yellow(), diagnostic);
    }
}

/// Show a unified diff between the original and rewritten stub.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("\n{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (updated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
