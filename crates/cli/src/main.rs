use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use arbor::{load_source, Grammar, ParseHost};
use common::{Finding, IssueLocation, OutputMode};
use warden::{report::emit, Engine, FileContext, RuleConfig};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Structural lint for JavaScript and TypeScript", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file or directory tree and report findings.
    Check {
        /// File or project root to analyse.
        path: PathBuf,
        /// Cognitive complexity threshold.
        #[arg(long, default_value_t = 15)]
        threshold: u32,
        /// Minimum function body lines for duplicate-function comparison.
        #[arg(long, default_value_t = 3)]
        min_lines: u32,
        /// Count JSX short-circuit rendering chains as complexity.
        #[arg(long)]
        count_jsx_short_circuit: bool,
        /// Run only the named rule (repeatable).
        #[arg(long = "rule")]
        rules: Vec<String>,
        /// Embed secondary locations as a JSON payload in the message data.
        #[arg(long)]
        embed_secondaries: bool,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// List the registered rules.
    Rules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Check {
            path,
            threshold,
            min_lines,
            count_jsx_short_circuit,
            rules,
            embed_secondaries,
            format,
        } => {
            let config = RuleConfig {
                complexity_threshold: *threshold,
                min_function_lines: *min_lines,
                treat_jsx_short_circuit_as_free: !count_jsx_short_circuit,
            };
            let mut engine = Engine::new(config);
            if !rules.is_empty() {
                engine = engine.with_rule_filter(rules.clone());
            }
            let mode = if *embed_secondaries {
                OutputMode::Embedded
            } else {
                OutputMode::Structured
            };

            let summary = run_check(path, &engine, mode);
            match format {
                Format::Text => print_text(&summary),
                Format::Json => print_json(&summary)?,
            }
            if summary.finding_count() > 0 {
                std::process::exit(1);
            }
        }
        Commands::Rules => {
            for name in warden::rule_names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

struct FileReport {
    path: String,
    findings: Vec<Finding>,
}

struct CheckSummary {
    files_analyzed: usize,
    skipped: Vec<(String, String)>,
    reports: Vec<FileReport>,
}

impl CheckSummary {
    fn finding_count(&self) -> usize {
        self.reports.iter().map(|r| r.findings.len()).sum()
    }
}

fn run_check(root: &Path, engine: &Engine, mode: OutputMode) -> CheckSummary {
    let mut host = ParseHost::new();
    let mut summary = CheckSummary {
        files_analyzed: 0,
        skipped: Vec::new(),
        reports: Vec::new(),
    };

    for path in source_files(root) {
        let display_path = path.display().to_string().replace('\\', "/");
        let Some(grammar) = Grammar::from_path(&path) else {
            continue;
        };
        let source = match load_source(&path) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %display_path, error = %e, "skipping unreadable file");
                summary.skipped.push((display_path, e.to_string()));
                continue;
            }
        };
        let tree = match host.parse(&source, grammar) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(path = %display_path, error = %e, "skipping unparsable file");
                summary.skipped.push((display_path, e.to_string()));
                continue;
            }
        };

        let ctx = FileContext {
            path: &display_path,
            source: &source,
        };
        let findings: Vec<Finding> = engine
            .analyze(&tree, &ctx)
            .into_iter()
            .map(|finding| emit(finding, mode))
            .collect();

        summary.files_analyzed += 1;
        if !findings.is_empty() {
            summary.reports.push(FileReport {
                path: display_path,
                findings,
            });
        }
    }

    summary
}

/// All analyzable source files under `root`, in deterministic order.
fn source_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_scan_excluded(e.path()))
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| Grammar::from_path(p).is_some())
        .collect();
    files.sort();
    files
}

/// Returns `true` if the path should be excluded from scanning.
fn is_scan_excluded(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| {
            matches!(
                name,
                ".git" | "node_modules" | "dist" | "build" | "coverage" | ".next" | "out"
            )
        })
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// output
// ---------------------------------------------------------------------------

fn print_text(summary: &CheckSummary) {
    for report in &summary.reports {
        for finding in &report.findings {
            println!(
                "{}:{}:{} [{}] {}",
                report.path,
                finding.span.start_line,
                finding.span.start_col,
                finding.rule,
                finding.message
            );
            for location in &finding.secondary_locations {
                println!(
                    "    {}:{} {}",
                    location.line,
                    location.column,
                    location.message.as_deref().unwrap_or("related")
                );
            }
        }
    }

    println!("+------------------------------------------+");
    println!("| WARDEN CHECK                             |");
    println!("+------------------------------------------+");
    println!("| Files analyzed : {:>22} |", summary.files_analyzed);
    println!("| Findings       : {:>22} |", summary.finding_count());
    println!("| Files skipped  : {:>22} |", summary.skipped.len());
    println!("+------------------------------------------+");

    for (path, error) in &summary.skipped {
        println!("  skipped {path}: {error}");
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFinding<'a> {
    file: &'a str,
    rule: &'static str,
    message_id: &'static str,
    line: u32,
    column: u32,
    end_line: u32,
    end_column: u32,
    message: &'a str,
    data: &'a BTreeMap<String, String>,
    secondary_locations: &'a [IssueLocation],
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    files_analyzed: usize,
    findings: Vec<JsonFinding<'a>>,
}

fn print_json(summary: &CheckSummary) -> anyhow::Result<()> {
    let findings: Vec<JsonFinding<'_>> = summary
        .reports
        .iter()
        .flat_map(|report| {
            report.findings.iter().map(|finding| JsonFinding {
                file: &report.path,
                rule: finding.rule,
                message_id: finding.message_id,
                line: finding.span.start_line,
                column: finding.span.start_col,
                end_line: finding.span.end_line,
                end_column: finding.span.end_col,
                message: &finding.message,
                data: &finding.data,
                secondary_locations: &finding.secondary_locations,
                cost: finding.cost,
            })
        })
        .collect();

    let output = JsonOutput {
        files_analyzed: summary.files_analyzed,
        findings,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
