use crate::cli::Strategy;
use crate::config::Config;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use taxdist_spider::extract::extract_documents;
use taxdist_spider::fetch::{FetchStrategy, HttpSource, Listing, Predicted};
use taxdist_spider::http::HttpClient;
use taxdist_spider::sheets::Sink;
use taxdist_spider::table::ResultTable;
use taxdist_spider::urls::CandidateRange;
use tracing::{debug, info, trace};

/// Options for one collection run.
#[derive(Debug)]
pub(crate) struct RunOptions {
    pub out_dir: PathBuf,
    pub strategy: Strategy,
    pub start_year: i32,
    pub confirmed_only: bool,
    pub base_url: String,
    pub timeout: Duration,
    pub tab: String,
    pub dry_run: bool,
}

fn build_strategy(options: &RunOptions, client: &HttpClient) -> Box<dyn FetchStrategy> {
    let source = HttpSource::new(client.clone());
    match options.strategy {
        Strategy::Predicted => {
            let today = chrono::Local::now().date_naive();
            let mut range =
                CandidateRange::new(options.start_year, today).with_base(&options.base_url);
            if options.confirmed_only {
                range = range.confirmed_only();
            }
            Box::new(Predicted::new(range, source))
        }
        Strategy::Listing => Box::new(Listing::new(client.clone(), source)),
    }
}

/// Fetch, extract and replace the sheet tab, in that order.
pub(crate) async fn run(options: RunOptions, tui: bool) -> anyhow::Result<()> {
    let time = std::time::Instant::now();
    trace!("run options: {options:?}");

    // credentials are checked before any download, so a misconfigured run
    // fails fast
    let config = if options.dry_run {
        None
    } else {
        Some(Config::from_env().await?)
    };

    let client = taxdist_spider::std_client_build(options.timeout)?;

    // 1. documents
    let strategy = build_strategy(&options, &client);
    let paths = strategy.fetch(&options.out_dir, tui).await?;
    debug!("{} documents to extract", paths.len());

    // 2. tables
    let table = extract_documents(&paths, tui)?;
    info!(
        "{} rows extracted from {} documents",
        table.len(),
        paths.len()
    );

    // 3. sheet
    match config {
        None => print_table(&table),
        Some(config) => {
            let sink = Sink::open(
                client,
                &config.account,
                &config.spreadsheet_id,
                &options.tab,
            )
            .await?;
            if sink.replace(&table).await? && tui {
                println!(
                    "{} rows written to {}\n",
                    table.len().to_string().green(),
                    options.tab.bold()
                );
            }
        }
    }

    info!("run finished, time elapsed: {:?}", time.elapsed());

    Ok(())
}

/// Print the rows currently held in `tab`.
pub(crate) async fn show(tab: &str) -> anyhow::Result<()> {
    let config = Config::from_env().await?;
    let client = taxdist_spider::std_client_build(taxdist_spider::REQUEST_TIMEOUT)?;
    let sink = Sink::open(client, &config.account, &config.spreadsheet_id, tab).await?;

    let table = sink.fetch().await?;
    print_table(&table);

    Ok(())
}

fn print_table(table: &ResultTable) {
    if table.is_empty() {
        println!("{}", "no matching rows".yellow());
        return;
    }

    let [entity, amount, source] = ResultTable::COLUMNS;
    println!(
        "{:<24} {:>16}  {}",
        entity.bold(),
        amount.bold(),
        source.bold()
    );
    for record in table.records() {
        println!(
            "{:<24} {:>16.2}  {}",
            record.entity, record.amount, record.source_document
        );
    }
}
