//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative apart from the value parsers for timestamps.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use logvault_core::query::parse_duration;

/// logvault -- query the log store and its compliance archive.
///
/// Use `logvault <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logvault", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logvault.toml configuration file.
    #[arg(short, long, default_value = "logvault.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Re-run a failed query this many times (transport and 5xx errors only).
    #[arg(long, global = true, default_value_t = 0)]
    pub retries: u32,

    /// Fixed delay between retries, in milliseconds.
    #[arg(long, global = true, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration.
    Config(ConfigArgs),

    /// List raw log records of one kind.
    Logs(LogsArgs),

    /// Report unique endpoint-to-endpoint flows for namespaces.
    Flows(FlowsArgs),

    /// Query configuration-change audit events.
    Audit(AuditArgs),

    /// Query CIS benchmark results.
    Benchmarks(BenchmarksArgs),

    /// Query archived compliance reports.
    Reports(ReportsArgs),

    /// List threat feed sets.
    Threatfeeds(ThreatfeedsArgs),
}

// ---- shared ----

/// Cluster and time window shared by every query command.
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Cluster to query (sent as `x-cluster-id`).
    #[arg(long, default_value = "cluster")]
    pub cluster: String,

    /// Window start: RFC3339 timestamp or a duration ago (e.g. `15m`, `2h`).
    #[arg(long, value_parser = parse_time)]
    pub from: Option<DateTime<Utc>>,

    /// Window end: RFC3339 timestamp, a duration ago, or `now`.
    #[arg(long, value_parser = parse_time)]
    pub to: Option<DateTime<Utc>>,
}

/// Parses an absolute RFC3339 timestamp or a relative `<duration>` meaning
/// that long before now.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>, String> {
    parse_time_at(input, Utc::now())
}

pub(crate) fn parse_time_at(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }
    let ago = parse_duration(input)
        .map_err(|e| format!("expected RFC3339 timestamp, `now` or a duration: {e}"))?;
    let ago = chrono::Duration::from_std(ago).map_err(|e| e.to_string())?;
    now.checked_sub_signed(ago)
        .ok_or_else(|| format!("duration '{input}' is out of range"))
}

// ---- config ----

/// Validate or display configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,

    /// Display the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, client, query).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- logs ----

/// Log kinds served by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogKind {
    Dns,
    Waf,
    Flow,
    Audit,
    Events,
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Log kind to list.
    #[arg(value_enum)]
    pub kind: LogKind,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Stop after this many records (0 = config default).
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Records per request (defaults to `query.page_size`).
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Free-form selector expression.
    #[arg(long)]
    pub selector: Option<String>,
}

// ---- flows ----

#[derive(Args, Debug)]
pub struct FlowsArgs {
    /// Namespace to match on either side of a flow (repeatable).
    #[arg(short, long = "namespace", required = true)]
    pub namespaces: Vec<String>,

    #[command(flatten)]
    pub window: WindowArgs,
}

// ---- audit ----

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Restrict to a resource type, optionally `resource/namespace/name` (repeatable).
    #[arg(long = "resource")]
    pub resources: Vec<String>,

    #[command(flatten)]
    pub window: WindowArgs,
}

// ---- benchmarks ----

#[derive(Args, Debug)]
pub struct BenchmarksArgs {
    #[command(subcommand)]
    pub action: BenchmarksAction,
}

#[derive(Subcommand, Debug)]
pub enum BenchmarksAction {
    /// Latest result per node, preferring successful runs.
    Latest {
        /// Restrict to these nodes (repeatable).
        #[arg(long = "node")]
        nodes: Vec<String>,

        /// Restrict to a benchmark version.
        #[arg(long)]
        version: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Fetch one benchmark set by ID.
    Get {
        id: String,

        #[arg(long, default_value = "cluster")]
        cluster: String,
    },
}

// ---- reports ----

#[derive(Args, Debug)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub action: ReportsAction,
}

#[derive(Subcommand, Debug)]
pub enum ReportsAction {
    /// List archived report summaries one numbered page at a time.
    List {
        /// Match a report name (repeatable).
        #[arg(long = "name")]
        names: Vec<String>,

        /// Match a report type (repeatable).
        #[arg(long = "type")]
        types: Vec<String>,

        /// Zero-based page number.
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Page size and total cap.
        #[arg(long)]
        max_items: Option<usize>,

        /// Sort key as `field` or `field:desc` (repeatable, first wins).
        #[arg(long = "sort")]
        sort: Vec<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Most recent report summary with the given name.
    Last {
        name: String,

        #[arg(long, default_value = "cluster")]
        cluster: String,
    },

    /// Fetch a full archived report by ID.
    Get {
        id: String,

        #[arg(long, default_value = "cluster")]
        cluster: String,
    },
}

// ---- threatfeeds ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedKind {
    /// IP address sets.
    Ip,
    /// Domain name sets.
    Domain,
}

#[derive(Args, Debug)]
pub struct ThreatfeedsArgs {
    /// Feed kind to list.
    #[arg(value_enum)]
    pub kind: FeedKind,

    /// Fetch a single feed set by ID.
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, default_value = "cluster")]
    pub cluster: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_time_accepts_rfc3339() {
        let at = parse_time_at("2026-05-01T10:00:00+02:00", now()).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn parse_time_accepts_relative_duration() {
        let at = parse_time_at("1h30m", now()).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 6, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn parse_time_accepts_now() {
        assert_eq!(parse_time_at("NOW", now()).unwrap(), now());
    }

    #[test]
    fn parse_time_rejects_garbage() {
        let err = parse_time_at("yesterday", now()).unwrap_err();
        assert!(err.contains("RFC3339"), "unexpected message: {err}");
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "logvault",
            "flows",
            "-n",
            "default",
            "--output",
            "json",
            "--retries",
            "2",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.retries, 2);
        assert_eq!(cli.retry_delay_ms, 1000);
        let Commands::Flows(args) = cli.command else {
            panic!("expected flows command");
        };
        assert_eq!(args.namespaces, vec!["default"]);
        assert_eq!(args.window.cluster, "cluster");
    }

    #[test]
    fn flows_requires_a_namespace() {
        assert!(Cli::try_parse_from(["logvault", "flows"]).is_err());
    }

    #[test]
    fn logs_kind_and_window_parse() {
        let cli = Cli::try_parse_from([
            "logvault",
            "logs",
            "dns",
            "--cluster",
            "east",
            "--from",
            "2026-05-01T00:00:00Z",
            "--max-results",
            "50",
        ])
        .unwrap();
        let Commands::Logs(args) = cli.command else {
            panic!("expected logs command");
        };
        assert_eq!(args.kind, LogKind::Dns);
        assert_eq!(args.window.cluster, "east");
        assert!(args.window.from.is_some());
        assert!(args.window.to.is_none());
        assert_eq!(args.max_results, Some(50));
    }
}
