//! Command line arguments.

use std::path::PathBuf;

use anyhow::Context;
use anyhow::bail;
use clap::Parser;
use datagrid_lib::model::Params;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(
    name = "datagrid",
    version,
    about = "Page, search, filter and sort a JSON array of rows"
)]
pub struct Cli {
    /// JSON file holding an array of row objects, or `{ "data": [...], "meta": {...} }`.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Zero-based page to print.
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Rows per page.
    #[arg(long = "page-size", default_value_t = 10)]
    pub page_size: usize,

    /// Case-insensitive text matched against every string field.
    #[arg(long)]
    pub search: Option<String>,

    /// Equality filter, `field=value`. Values are parsed as JSON when possible.
    #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, Value)>,

    /// Sort key, `field` or `field:desc`. Repeatable.
    #[arg(long = "sort", value_name = "FIELD[:DIR]", value_parser = parse_sort)]
    pub sorting: Vec<(String, Value)>,

    /// Select every row of the result and print the selection count.
    #[arg(long = "select-all")]
    pub select_all: bool,

    /// Label attached to rows selected with `--select-all`.
    #[arg(long, requires = "select_all")]
    pub group: Option<String>,

    /// Search debounce window in milliseconds.
    #[arg(long = "search-wait", default_value_t = 300)]
    pub search_wait_ms: u64,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn filter_params(&self) -> Params {
        self.filters.iter().cloned().collect()
    }

    pub fn sort_params(&self) -> Params {
        self.sorting.iter().cloned().collect()
    }
}

fn parse_filter(raw: &str) -> anyhow::Result<(String, Value)> {
    let (field, value) = raw
        .split_once('=')
        .with_context(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    if field.is_empty() {
        bail!("filter field must not be empty");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

fn parse_sort(raw: &str) -> anyhow::Result<(String, Value)> {
    let (field, direction) = raw.split_once(':').unwrap_or((raw, "asc"));
    match direction {
        "asc" | "desc" => Ok((field.to_string(), Value::from(direction))),
        other => bail!("unknown sort direction `{other}`, expected asc or desc"),
    }
}
