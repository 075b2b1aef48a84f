//! Datagrid CLI.
//!
//! Drives a table controller over a local JSON file and prints one page.

mod cli;
mod source;

use std::fs::File;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use datagrid_lib::TableConfig;
use datagrid_lib::TableController;
use datagrid_lib::TableProps;
use datagrid_lib::model::TableState;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::cli::Cli;
use crate::source::JsonSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let source = JsonSource::load(&cli.file)?;
    let table = TableController::new(
        source,
        TableConfig::default().with_search_wait(Duration::from_millis(cli.search_wait_ms)),
    );

    table.initialize(
        TableProps::default()
            .with_page_size(cli.page_size)
            .with_filters(cli.filter_params()),
    );
    table.idle().await;

    if !cli.sorting.is_empty() {
        log::debug!("sorting: {:?}", table.set_sorting(cli.sort_params()));
    }
    if let Some(search) = &cli.search {
        log::debug!("search: {:?}", table.set_search(search.as_str()));
        table.idle().await;
    }
    if cli.page > 0 {
        log::debug!("page: {:?}", table.set_page(cli.page));
    }

    let state = table.idle().await;
    if let Some(err) = state.error() {
        anyhow::bail!("fetch failed: {err}");
    }
    print_page(&state)?;

    if cli.select_all {
        table.toggle_select_all(cli.group.as_deref());
        println!("selected {} rows", table.snapshot().selected().len());
    }
    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    match &cli.log_file {
        Some(path) => {
            let log_file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), log_file)?;
        }
        None => TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            simplelog::ColorChoice::Auto,
        )?,
    }
    Ok(())
}

fn print_page(state: &TableState) -> anyhow::Result<()> {
    for row in state.page_data() {
        println!("{}", serde_json::to_string(row.as_value())?);
    }

    let count = |field: &str| state.meta().get(field).and_then(serde_json::Value::as_u64);
    let matched = count("count").unwrap_or(state.data().len() as u64);
    let total = count("total").unwrap_or(matched);
    println!(
        "page {} of {} ({matched} of {total} rows)",
        state.page() + 1,
        state.page_count().max(1)
    );
    Ok(())
}
