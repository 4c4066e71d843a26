mod cli;
mod config;
mod spider;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use std::time::Duration;
use tracing::{subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        })?;
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    // read cli inputs
    use cli::Commands::*;
    match cli.command {
        // `taxdist run`: fetch, extract and replace the sheet tab
        Run {
            out_dir,
            strategy,
            start_year,
            confirmed_only,
            base_url,
            timeout,
            tab,
            dry_run,
        } => {
            spider::run(
                spider::RunOptions {
                    out_dir,
                    strategy,
                    start_year,
                    confirmed_only,
                    base_url,
                    timeout: Duration::from_secs(timeout),
                    tab,
                    dry_run,
                },
                tui,
            )
            .await?
        }

        // `taxdist show`: print the sheet tab
        Show { tab } => spider::show(&tab).await?,
    }

    Ok(())
}
