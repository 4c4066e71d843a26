use crate::table::ResultTable;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

mod auth;
mod google;

pub use auth::{AccessToken, ServiceAccount, SCOPE};
pub use google::{GoogleSheets, SHEETS_API};

/// Tab the aggregated table is written to.
pub const DEFAULT_TAB: &str = "Raw";

/// A remote store of named tabs holding rows of cells.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Remove every value from `tab`.
    async fn clear(&self, tab: &str) -> Result<()>;

    /// Write `rows` from the top-left of `tab`, letting the store interpret
    /// each value's type.
    async fn write(&self, tab: &str, rows: &[Vec<Value>]) -> Result<()>;

    /// Every row currently in `tab`.
    async fn read(&self, tab: &str) -> Result<Vec<Vec<Value>>>;
}

/// Replaces a single tab of a store with a run's result table.
pub struct Sink<S> {
    store: S,
    tab: String,
}

impl<S: SheetStore> Sink<S> {
    pub fn new(store: S, tab: impl Into<String>) -> Self {
        Self {
            store,
            tab: tab.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    /// Clear the tab and write the header plus every record.
    ///
    /// An empty table never touches the store, so a run that found nothing
    /// cannot wipe the previous results. Returns whether anything was written.
    /// The clear and the write are separate calls; failing between them
    /// leaves the tab empty.
    pub async fn replace(&self, table: &ResultTable) -> Result<bool> {
        if table.is_empty() {
            info!("no rows extracted; leaving {} untouched", self.tab);
            return Ok(false);
        }

        let time = std::time::Instant::now();
        let rows = table.to_rows();

        debug!("clearing {}", self.tab);
        self.store.clear(&self.tab).await.map_err(|err| {
            error!("failed to clear {}, error({err})", self.tab);
            err
        })?;

        debug!("writing {} rows to {}", rows.len(), self.tab);
        self.store.write(&self.tab, &rows).await.map_err(|err| {
            error!("failed to write {}, error({err})", self.tab);
            err
        })?;

        info!(
            "{} records written to {}, {}",
            table.len(),
            self.tab,
            crate::time_elapsed(time)
        );
        Ok(true)
    }

    /// Read the tab back as a result table.
    pub async fn fetch(&self) -> Result<ResultTable> {
        let rows = self.store.read(&self.tab).await?;
        Ok(ResultTable::from_rows(&rows))
    }
}

impl Sink<GoogleSheets> {
    /// Authenticate, open the spreadsheet and select `tab`.
    pub async fn open(
        client: crate::http::HttpClient,
        account: &ServiceAccount,
        spreadsheet_id: &str,
        tab: &str,
    ) -> Result<Self> {
        let sheets = GoogleSheets::open(client, account, spreadsheet_id).await?;
        sheets.select(tab).await?;
        Ok(Self::new(sheets, tab))
    }
}
