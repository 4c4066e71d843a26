use dotenv::var;
use taxdist_spider::sheets::ServiceAccount;
use tracing::{error, trace};

/// Secrets needed to reach the spreadsheet, read from the environment.
#[derive(Debug)]
pub(crate) struct Config {
    pub account: ServiceAccount,
    pub spreadsheet_id: String,
}

impl Config {
    pub(crate) async fn from_env() -> anyhow::Result<Self> {
        trace!("reading sheet configuration from environment");
        let account = ServiceAccount::from_env().await?;
        let spreadsheet_id = var("GOOGLE_SHEET_ID").map_err(|err| {
            error!("environment variable GOOGLE_SHEET_ID, error({err})");
            err
        })?;

        Ok(Self {
            account,
            spreadsheet_id,
        })
    }
}
