use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use lint_patcher::rules::{self, RuleTable};
use lint_patcher::{
    telemetry, FileReport, Mode, PatchRunner, RunReport, TargetSelector, CONFIRMATION,
};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lint-patcher")]
#[command(about = "Apply ordered regex lint fixes to source files", long_about = None)]
#[command(version)]
struct Cli {
    /// Log rule-by-rule activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Defaults to `apply` with the built-in rules and target
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct Selection {
    /// Rule table file, or a directory of *.toml rule files (default: built-in rules)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// File path or glob to rewrite (default: the rule table's target)
    #[arg(short, long)]
    target: Option<String>,

    /// Directory relative targets are resolved against (default: current directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the target files with every rule, in order
    Apply {
        #[command(flatten)]
        selection: Selection,

        /// Dry run - compute the result without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Report how often each rule matched
        #[arg(long)]
        report: bool,

        /// Report format; json prints the full run report instead of text
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show per-rule match counts without modifying files
    Status {
        #[command(flatten)]
        selection: Selection,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check that every idempotent rule is already applied
    Verify {
        #[command(flatten)]
        selection: Selection,
    },

    /// List rules in the order they run
    List {
        /// Rule table file, or a directory of *.toml rule files (default: built-in rules)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(error) = telemetry::init(cli.verbose) {
        eprintln!("{}", format!("Warning: {error}").yellow());
    }

    match cli.command {
        None => cmd_apply(Selection::default(), Mode::Write, false, false, OutputFormat::Text),

        Some(Commands::Apply {
            selection,
            dry_run,
            diff,
            report,
            format,
        }) => {
            let mode = if dry_run { Mode::DryRun } else { Mode::Write };
            cmd_apply(selection, mode, diff, report, format)
        }

        Some(Commands::Status { selection, format }) => cmd_status(selection, format),

        Some(Commands::Verify { selection }) => cmd_verify(selection),

        Some(Commands::List { rules }) => cmd_list(rules.as_deref()),
    }
}

/// Helper: the rule table from `--rules`, or the built-in one.
fn load_table(path: Option<&Path>) -> Result<RuleTable> {
    let table = match path {
        Some(path) => rules::load_rules(path)?,
        None => rules::builtin()?,
    };
    Ok(table)
}

fn build_runner(selection: &Selection) -> Result<PatchRunner> {
    let table = load_table(selection.rules.as_deref())?;
    let selector = selection.target.as_deref().map(TargetSelector::parse);

    let mut runner = PatchRunner::from_table(&table, selector)?;
    if let Some(workspace) = &selection.workspace {
        runner = runner.with_root(workspace.clone());
    }
    Ok(runner)
}

/// Helper: changed hunks of one target, with three lines of context
fn display_diff(file: &FileReport) {
    println!();
    println!(
        "{}",
        format!(
            "{} ({} replacement(s))",
            file.path.display(),
            file.total_matches()
        )
        .bold()
    );

    let diff = TextDiff::from_lines(file.original.as_str(), file.patched.as_str());
    let mut unified = diff.unified_diff();
    unified.context_radius(3);

    for hunk in unified.iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{change}").red(),
                ChangeTag::Insert => format!("+{change}").green(),
                ChangeTag::Equal => format!(" {change}").normal(),
            };
            print!("{line}");
        }
    }
}

/// Helper: per-rule match counts for one file
fn display_rule_counts(file: &FileReport) {
    println!("{}", file.path.display().to_string().bold());
    for outcome in &file.rules {
        if outcome.matches == 0 {
            println!("  {} {}", "⊘".yellow(), outcome);
        } else {
            println!("  {} {}", "✓".green(), outcome);
        }
    }

    let unmatched = file.unmatched().count();
    if unmatched > 0 {
        println!(
            "  {}",
            format!("{} of {} rule(s) matched nothing", unmatched, file.rules.len()).dimmed()
        );
    }
}

fn print_json(report: &RunReport) -> Result<()> {
    println!("{}", report.to_json()?);
    Ok(())
}

fn cmd_apply(
    selection: Selection,
    mode: Mode,
    show_diff: bool,
    show_report: bool,
    format: OutputFormat,
) -> Result<()> {
    let runner = build_runner(&selection)?
        .with_mode(mode)
        .with_diagnostics(show_report);

    let report = runner.run()?;

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    let dry_run = runner.mode() == Mode::DryRun;
    if dry_run {
        println!("{}", "[DRY RUN - no files were modified]".cyan());
    }

    for file in &report.files {
        if show_report {
            display_rule_counts(file);
        }
        if show_diff && file.changed {
            display_diff(file);
        }
    }

    if dry_run {
        let changed = report.changed_files().count();
        println!("{} of {} file(s) would change", changed, report.files.len());
    } else {
        println!("{}", CONFIRMATION);
    }

    Ok(())
}

fn cmd_status(selection: Selection, format: OutputFormat) -> Result<()> {
    let runner = build_runner(&selection)?.with_mode(Mode::DryRun);
    let report = runner.run()?;

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    println!("{}", "Rule Status Report".bold());
    println!("Target: {}", runner.selector());
    println!();

    for file in &report.files {
        display_rule_counts(file);
        let state = if file.changed {
            "would change".yellow()
        } else {
            "unchanged".green()
        };
        println!("  => {}", state);
        println!();
    }

    Ok(())
}

fn cmd_verify(selection: Selection) -> Result<()> {
    let runner = build_runner(&selection)?;

    println!("{}", "Verifying rules...".bold());
    println!("Target: {}", runner.selector());
    println!();

    let report = runner.verify()?;

    let mut verified = 0;
    let mut mismatch = 0;

    for file in &report.files {
        if file.changed {
            eprintln!("{} {}: MISMATCH", "✗".red(), file.path.display());
            for outcome in file.rules.iter().filter(|o| o.matches > 0) {
                eprintln!("  Pending: {}", outcome);
            }
            mismatch += 1;
        } else {
            println!("{} {}: Verified", "✓".green(), file.path.display());
            verified += 1;
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} verified", format!("{}", verified).green());
    println!("  {} mismatch", format!("{}", mismatch).red());

    if mismatch > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list(rules_path: Option<&Path>) -> Result<()> {
    let table = load_table(rules_path)?;
    let runner = PatchRunner::from_table(&table, None)?;

    if !table.meta.name.is_empty() {
        println!("{}", table.meta.name.bold());
    }
    if let Some(description) = &table.meta.description {
        println!("{}", description.dimmed());
    }
    println!("Target: {}", runner.selector());
    println!();

    let rules = runner.pipeline().transformations().iter().zip(&table.rules);
    for (idx, (transformation, definition)) in rules.enumerate() {
        let marker = if transformation.is_idempotent() {
            String::new()
        } else {
            format!(" {}", "(re-applies on every run)".yellow())
        };
        println!("{:>2}. {}{}", idx + 1, transformation.id().bold(), marker);
        if let Some(description) = &definition.description {
            println!("    {}", description.dimmed());
        }
        println!("    pattern:     {}", transformation.pattern());
        println!("    replacement: {:?}", transformation.replacement());
    }

    Ok(())
}
