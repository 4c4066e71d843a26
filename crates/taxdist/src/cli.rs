use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect distribution PDFs, extract the tracked rows and replace the sheet tab.
    Run {
        /// Directory downloaded documents are cached in.
        #[arg(short, long, default_value = "pdfs")]
        out_dir: PathBuf,

        /// How document locations are found.
        #[arg(short, long, value_enum, default_value_t = Strategy::Predicted)]
        strategy: Strategy,

        /// First year to predict document urls for.
        #[arg(
            long,
            default_value_t = taxdist_spider::urls::START_YEAR,
            value_parser = clap::value_parser!(i32).range(2000..=2099),
        )]
        start_year: i32,

        /// Skip tax types whose file identifier has never been seen published.
        #[arg(long)]
        confirmed_only: bool,

        /// Directory the predicted document urls are built under.
        #[arg(long, default_value = taxdist_spider::urls::DISTRIBUTION_URL)]
        base_url: String,

        /// Per-request timeout, in seconds.
        #[arg(long, default_value_t = taxdist_spider::REQUEST_TIMEOUT.as_secs())]
        timeout: u64,

        /// Spreadsheet tab to overwrite.
        #[arg(long, default_value = taxdist_spider::sheets::DEFAULT_TAB)]
        tab: String,

        /// Print the extracted table instead of writing it to the sheet.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the rows currently held in the sheet tab.
    Show {
        /// Spreadsheet tab to read.
        #[arg(long, default_value = taxdist_spider::sheets::DEFAULT_TAB)]
        tab: String,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Build every url from year, month and tax type.
    Predicted,

    /// Follow the links on the published distribution index page.
    Listing,
}
