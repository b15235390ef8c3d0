use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use prefix_renamer::config::{load_from_path, RenameConfig};
use prefix_renamer::output::{OutputWriter, WriteReport};
use prefix_renamer::rewrite::{FileChange, FileOutcome};
use prefix_renamer::{ast, rename_unit, ts, RenameReport};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "prefix-renamer")]
#[command(about = "Rename C++ data members to follow a prefix convention", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every touched file into the output directory
    Rename {
        #[command(flatten)]
        common: CommonArgs,

        /// Output directory (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dry run - show what would be written without touching the filesystem
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Reparse rewritten files and reject edits that break the syntax
        #[arg(long)]
        check_syntax: bool,
    },

    /// Report naming violations without writing anything
    Check {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Translation unit JSON files, or directories containing them
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root substring (overrides the config file)
    #[arg(short, long)]
    root: Option<String>,

    /// Required member prefix (overrides the config file)
    #[arg(short, long)]
    prefix: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rename {
            common,
            output,
            dry_run,
            diff,
            check_syntax,
        } => cmd_rename(common, output, dry_run, diff, check_syntax),

        Commands::Check { common } => cmd_check(common),
    }
}

/// Structured logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init only fails when a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Load the config file (or defaults) and apply command-line overrides.
fn resolve_config(common: &CommonArgs, output: Option<PathBuf>) -> Result<RenameConfig> {
    let mut config = match &common.config {
        Some(path) => load_from_path(path)?,
        None => RenameConfig::default(),
    };

    if let Some(root) = &common.root {
        config.root_dir = root.clone();
    }
    if let Some(prefix) = &common.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(output) = output {
        config.output_dir = output;
    }

    config.validate()?;
    Ok(config)
}

/// Helper: Expand directories into the `.json` files directly inside them.
fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
            {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();

        if found.is_empty() {
            eprintln!(
                "{}",
                format!("Warning: no .json files found in {}", input.display()).yellow()
            );
        }
        files.extend(found);
    }

    if files.is_empty() {
        anyhow::bail!("No translation unit inputs found");
    }
    Ok(files)
}

fn run_unit(path: &Path, config: &RenameConfig) -> Result<RenameReport> {
    let tu = ast::load_from_path(path)?;
    rename_unit(tu, config).with_context(|| format!("failed to process {}", path.display()))
}

fn print_diagnostics(report: &RenameReport) {
    for diagnostic in report.diagnostics.iter() {
        eprintln!("{}", diagnostic.to_string().yellow());
    }
}

/// Helper: Show unified diff between original and rewritten content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (renamed)", file.display()).dimmed());

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

fn check_outcome_syntax(outcome: &FileOutcome) -> Result<()> {
    if let FileChange::Rewritten {
        original, content, ..
    } = &outcome.change
    {
        ts::validate_rewrite(original, content)
            .with_context(|| format!("rewrite of {} breaks the syntax", outcome.path.display()))?;
    }
    Ok(())
}

fn cmd_rename(
    common: CommonArgs,
    output: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
    check_syntax: bool,
) -> Result<()> {
    let config = resolve_config(&common, output)?;
    let inputs = discover_inputs(&common.inputs)?;
    let writer = OutputWriter::new(&config.output_dir).dry_run(dry_run);

    println!("Root: {}", config.root_dir);
    println!("Output: {}", writer.root().display());
    if dry_run {
        println!("{}", "[DRY RUN - nothing will be written]".cyan());
    }
    println!();

    let mut total_written = 0;
    let mut total_unchanged = 0;
    let mut total_up_to_date = 0;
    let mut total_warnings = 0;

    for input in inputs {
        println!("Processing {}...", input.display());

        let report = run_unit(&input, &config)?;
        print_diagnostics(&report);
        total_warnings += report.diagnostics.len();

        // Syntax is checked for the whole unit before anything is written.
        if check_syntax {
            for outcome in &report.outcomes {
                check_outcome_syntax(outcome)?;
            }
        }

        for outcome in &report.outcomes {
            match writer.write(outcome)? {
                WriteReport::Written { source, target } => {
                    println!(
                        "{} Rewriting {} -> {}",
                        "✓".green(),
                        source.display(),
                        target.display()
                    );
                    total_written += 1;
                }
                WriteReport::WouldWrite { source, target } => {
                    println!(
                        "{} Would write {} -> {}",
                        "✓".green(),
                        source.display(),
                        target.display()
                    );
                    total_written += 1;
                }
                WriteReport::UpToDate { source, .. } => {
                    println!("{} Up to date {}", "⊙".yellow(), source.display());
                    total_up_to_date += 1;
                }
                WriteReport::Unchanged { source } => {
                    println!("{} No changes {}", "⊘".cyan(), source.display());
                    total_unchanged += 1;
                }
            }

            if show_diff {
                if let FileChange::Rewritten {
                    original, content, ..
                } = &outcome.change
                {
                    display_diff(&outcome.path, original, content);
                }
            }
        }

        println!();
    }

    println!("{}", "Summary:".bold());
    println!("  {} rewritten", format!("{}", total_written).green());
    println!("  {} up to date", format!("{}", total_up_to_date).yellow());
    println!("  {} unchanged", format!("{}", total_unchanged).cyan());
    println!("  {} warnings", format!("{}", total_warnings).yellow());

    Ok(())
}

fn cmd_check(common: CommonArgs) -> Result<()> {
    let config = resolve_config(&common, None)?;
    let inputs = discover_inputs(&common.inputs)?;

    println!("{}", "Checking member names...".bold());
    println!("Root: {}", config.root_dir);
    println!("Prefix: {}", config.prefix);
    println!();

    let mut violations = 0;

    for input in inputs {
        let report = run_unit(&input, &config)?;
        print_diagnostics(&report);

        if report.diagnostics.is_empty() {
            println!("{} {}", "✓".green(), input.display());
        } else {
            println!(
                "{} {}: {} violations",
                "✗".red(),
                input.display(),
                report.diagnostics.len()
            );
        }
        violations += report.diagnostics.len();
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} violations", format!("{}", violations).red());

    if violations > 0 {
        std::process::exit(1);
    }

    Ok(())
}
