mod error;
pub(crate) mod fs;
pub(crate) mod tui;

/// Tax type identifiers embedded in the distribution file names.
pub mod codes;

/// Predictable document locations; one candidate per year, month and tax type.
pub mod urls;

/// Local document cache and the two ways of filling it.
pub mod fetch;

/// Best-effort PDF tables and the entity row filter.
pub mod extract;

/// The flat result table handed to the sink.
pub mod table;

/// Spreadsheet sink, backed by the [Google Sheets API].
///
/// [Google Sheets API]: https://developers.google.com/sheets/api/reference/rest
pub mod sheets;

pub use error::{Error, Result};

/// Shortcut for required API elements.
pub mod http {
    pub use dotenv::var;
    pub use reqwest::Client as HttpClient;
}

use std::time::{Duration, Instant};

/// Default per-request timeout for document downloads.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the HTTP client shared by every request of a run.
///
/// `USER_AGENT` is read from the environment when present.
pub fn std_client_build(timeout: Duration) -> Result<http::HttpClient> {
    let mut builder = reqwest::ClientBuilder::new().timeout(timeout);
    if let Ok(user_agent) = http::var("USER_AGENT") {
        builder = builder.user_agent(user_agent);
    }
    Ok(builder.build()?)
}

/// Format the elapsed time since `time` for log lines.
pub(crate) fn time_elapsed(time: Instant) -> String {
    format!("time elapsed: {:?}", time.elapsed())
}
