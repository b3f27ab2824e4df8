use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use vitestify::config::load_for_root;
use vitestify::edit::{write_back, Fingerprint};
use vitestify::rewrite::{read_source, rewrite_source, Outcome};
use vitestify::runner::{run, FileOutcome, FileReport, RunMode, RunOptions, RunSummary};
use vitestify::{VitestifyConfig, WorkspaceGuard};

#[derive(Parser)]
#[command(name = "vitestify")]
#[command(about = "Rewrite Jest test files to Vitest", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every matching test file under the repository root
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Rewrite a single file and print the result
    File {
        /// File to rewrite
        path: PathBuf,

        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Exit with status 1 if any file would be rewritten
    Check {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Repository root (auto-detected if not specified)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Config file (defaults to <root>/vitestify.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replace __dirname / __filename with an ES module shim
    #[arg(long)]
    esm_shims: bool,

    /// Await userEvent calls and make their functions async
    #[arg(long)]
    testing_library: bool,

    /// Number of worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print a line for every file, not just failures
    #[arg(short, long)]
    verbose: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl CommonArgs {
    fn load(&self) -> Result<(PathBuf, VitestifyConfig)> {
        let root = resolve_root(self.root.clone())?;
        let mut config = load_for_root(&root, self.config.as_deref())?;
        config.rewrite.esm_shims |= self.esm_shims;
        config.rewrite.testing_library |= self.testing_library;
        Ok((root, config))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            common,
            dry_run,
            diff,
        } => {
            let mode = if dry_run { RunMode::DryRun } else { RunMode::Write };
            cmd_run(common, mode, diff)
        }

        Commands::File {
            path,
            write,
            common,
        } => cmd_file(path, write, common),

        Commands::Check { common } => cmd_run(common, RunMode::Check, false),
    }
}

/// Resolve the repository root
///
/// Priority order:
/// 1. Explicit --root flag
/// 2. VITESTIFY_ROOT environment variable
/// 3. Nearest ancestor with package.json and a workspace or git marker
/// 4. Current directory
fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    // 1. Explicit flag
    if let Some(path) = explicit {
        return path
            .canonicalize()
            .with_context(|| format!("Root path doesn't exist: {}", path.display()));
    }

    // 2. Environment variable
    if let Ok(env_path) = env::var("VITESTIFY_ROOT") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path.canonicalize()?);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: VITESTIFY_ROOT is set but path doesn't exist: {}",
                env_path
            )
            .yellow()
        );
    }

    let current = env::current_dir().context("Could not read current directory")?;

    // 3. Auto-detect from current directory
    if let Some(path) = auto_detect_root(&current) {
        return Ok(path);
    }

    // 4. Fall back to where we are
    Ok(current.canonicalize()?)
}

/// Walk up looking for a JavaScript project root
fn auto_detect_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            dir.join("package.json").is_file()
                && (dir.join("pnpm-workspace.yaml").is_file() || dir.join(".git").exists())
        })
        .and_then(|dir| dir.canonicalize().ok())
}

/// Helper: Show unified diff between original and rewritten content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (vitest)", file.display()).dimmed());

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

fn display_path<'a>(root: &Path, path: &'a Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}

fn report_file(root: &Path, report: &FileReport, mode: RunMode, verbose: bool, diff: bool) {
    let path = display_path(root, &report.path);
    match &report.outcome {
        FileOutcome::Rewritten { texts } => {
            if verbose {
                let verb = if mode.writes() {
                    "Rewrote"
                } else {
                    "Would rewrite"
                };
                println!("{} {} {}", "✓".green(), verb, path);
            }
            if diff {
                if let Some((before, after)) = texts {
                    display_diff(&report.path, before, after);
                }
            }
        }
        FileOutcome::Unchanged => {
            if verbose {
                println!("{} {} {}", "⊙".yellow(), "Unchanged".dimmed(), path);
            }
        }
        FileOutcome::Failed(err) => {
            eprintln!("{} {}: {}", "✗".red(), path, err);
        }
    }
}

fn print_summary(summary: &RunSummary, mode: RunMode) {
    println!();
    println!("{}", "Summary:".bold());
    let rewritten = if mode.writes() {
        "rewritten"
    } else {
        "would be rewritten"
    };
    println!("  {} {}", format!("{}", summary.rewritten).green(), rewritten);
    println!("  {} unchanged", format!("{}", summary.unchanged).yellow());
    println!("  {} failed", format!("{}", summary.failed).red());
    println!(
        "{}",
        format!(
            "  {} files in {} ms on {} workers",
            summary.total(),
            summary.elapsed_ms,
            summary.workers
        )
        .dimmed()
    );
}

fn cmd_run(common: CommonArgs, mode: RunMode, show_diff: bool) -> Result<()> {
    // 1. Resolve root and configuration
    let (root, config) = common.load()?;

    if !common.json {
        println!("Root: {}", root.display());
        if mode == RunMode::DryRun {
            println!("{}", "[DRY RUN - showing what would be rewritten]".cyan());
        }
        println!();
    }

    // 2. Rewrite
    let options = RunOptions {
        mode,
        workers: common.workers,
        capture_output: show_diff,
    };
    let verbose = common.verbose && !common.json;
    let summary = run(&root, &config, &options, |report| {
        report_file(&root, report, mode, verbose, show_diff && !common.json)
    })?;

    // 3. Summary
    if common.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, mode);
    }

    if summary.has_failures() || (mode == RunMode::Check && summary.rewritten > 0) {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_file(path: PathBuf, write: bool, common: CommonArgs) -> Result<()> {
    let (root, config) = common.load()?;
    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()?.join(path)
    };

    let source = read_source(&path)?;
    let fingerprint = Fingerprint::of(source.as_bytes());

    let output = match rewrite_source(&path, source.clone(), &config.rewrite)? {
        Outcome::NoOp => {
            if write {
                eprintln!("{} {}", "⊙".yellow(), "Nothing to rewrite".dimmed());
            } else {
                print!("{}", source);
            }
            return Ok(());
        }
        Outcome::Rewritten(output) => output,
    };

    if !write {
        print!("{}", output);
        return Ok(());
    }

    let guard = WorkspaceGuard::new(&root)?;
    let target = guard.validate_path(&path)?;
    write_back(&target, &output, fingerprint)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    eprintln!("{} Rewrote {}", "✓".green(), display_path(&root, &target));

    Ok(())
}
