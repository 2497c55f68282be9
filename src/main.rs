use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use runlog_logs::{
    parse_log_query, parse_records, FilterEngine, FilterSpec, LogBuffer, LogLevel,
    MatchHighlighter,
};

mod config;
mod output;

use config::Config;
use output::{print_counts, Printer};

/// runlog - filter and print a run's event log
#[derive(Parser, Debug)]
#[command(name = "runlog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines file with one event record per line
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Query, e.g. `step:load_users type:MATERIALIZATION failed`
    #[arg(short, long, default_value = "")]
    query: String,

    /// Show only these levels
    #[arg(long, value_delimiter = ',', value_parser = parse_level)]
    levels: Vec<LogLevel>,

    /// Hide these levels
    #[arg(long, value_delimiter = ',', value_parser = parse_level)]
    hide_levels: Vec<LogLevel>,

    /// Drop records emitted before this time (ms since epoch)
    #[arg(long)]
    since: Option<i64>,

    /// Keep records that do not match the query, marking matches with `*`
    #[arg(long)]
    show_non_matches: bool,

    /// Step key considered relevant for `query:` terms (repeatable)
    #[arg(long = "scope-step", value_name = "STEP_KEY")]
    scope_steps: Vec<String>,

    /// Config file (defaults to ./runlog.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print per-level record counts before the records
    #[arg(long)]
    counts: bool,

    /// Highlight text matches with ANSI colors
    #[arg(long)]
    highlight: bool,
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::parse(s).ok_or_else(|| format!("unknown level '{}'", s))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args);

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("reading event log {}", args.file.display()))?;
    let records = parse_records(&text)
        .with_context(|| format!("parsing event log {}", args.file.display()))?;

    let buffer = LogBuffer::new();
    buffer.push_page(records, None);
    tracing::debug!(records = buffer.len(), "loaded event log");

    let spec = build_spec(&args, &config);
    let relevant_step_keys: HashSet<String> = config
        .relevant_step_keys
        .iter()
        .chain(args.scope_steps.iter())
        .cloned()
        .collect();

    let engine = FilterEngine::new();
    let records = buffer.snapshot();
    let logs = engine.filter(&records, &spec, &relevant_step_keys);
    let highlighter = build_highlighter(&args, &spec)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.counts {
        print_counts(&mut out, &buffer.level_counts(engine.classifier()))?;
        writeln!(out)?;
    }

    let printer = Printer {
        classifier: engine.classifier(),
        highlighter: &highlighter,
        local_time: config.local_time,
        highlight: args.highlight,
        mark_matches: spec.has_text_query() && !spec.hide_non_matches,
    };
    printer.print_logs(&mut out, &logs)?;

    Ok(())
}

/// Only compiled when highlighting was asked for
fn build_highlighter(args: &Args, spec: &FilterSpec) -> Result<MatchHighlighter> {
    if !args.highlight {
        return Ok(MatchHighlighter::default());
    }
    MatchHighlighter::new(&spec.log_query).context("building highlighter")
}

/// Combine config defaults with command-line flags
fn build_spec(args: &Args, config: &Config) -> FilterSpec {
    let mut spec = FilterSpec::default();

    if !args.levels.is_empty() {
        spec = spec.with_levels(args.levels.iter().copied());
    } else if let Some(levels) = &config.levels {
        spec = spec.with_levels(levels.iter().copied());
    }
    for level in &args.hide_levels {
        spec.set_level(*level, false);
    }

    if let Some(since) = args.since {
        spec = spec.with_since_time(since);
    }

    let hide_non_matches = if args.show_non_matches {
        false
    } else {
        config.hide_non_matches.unwrap_or(true)
    };

    spec.with_query(parse_log_query(&args.query))
        .with_hide_non_matches(hide_non_matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlog_logs::QueryToken;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("runlog").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            levels: Some(vec![LogLevel::Error]),
            hide_non_matches: Some(true),
            ..Config::default()
        };
        let args = args(&[
            "run.jsonl",
            "--levels",
            "info,warn",
            "--show-non-matches",
            "--query",
            "step:load oops",
        ]);

        let spec = build_spec(&args, &config);
        assert!(spec.level_enabled(LogLevel::Info));
        assert!(spec.level_enabled(LogLevel::Warning));
        assert!(!spec.level_enabled(LogLevel::Error));
        assert!(!spec.hide_non_matches);
        assert_eq!(spec.log_query[0].token, QueryToken::Step);
        assert_eq!(spec.log_query.len(), 2);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config {
            levels: Some(vec![LogLevel::Error]),
            hide_non_matches: Some(false),
            ..Config::default()
        };
        let spec = build_spec(&args(&["run.jsonl", "--hide-levels", "error"]), &config);
        assert!(LogLevel::ALL.iter().all(|l| !spec.level_enabled(*l)));
        assert!(!spec.hide_non_matches);
        assert!(!spec.has_text_query());
    }

    #[test]
    fn test_highlighter_only_with_flag() {
        let config = Config::default();

        let plain = args(&["run.jsonl", "--query", "failed"]);
        let spec = build_spec(&plain, &config);
        assert!(!build_highlighter(&plain, &spec).unwrap().has_pattern());

        let highlighted = args(&["run.jsonl", "--query", "failed", "--highlight"]);
        let spec = build_spec(&highlighted, &config);
        assert!(build_highlighter(&highlighted, &spec).unwrap().has_pattern());
    }

    #[test]
    fn test_unknown_level_rejected() {
        let result = Args::try_parse_from(["runlog", "run.jsonl", "--levels", "loud"]);
        assert!(result.is_err());
    }
}
